// tests/catalog_tests.rs
mod common;

use common::*;
use icaro::{Catalog, CatalogError, NewProductForm, UploadLayout, UploadedFile};

#[tokio::test]
async fn test_create_appends_record_with_rewritten_paths() {
  setup_tracing();
  let sb = Sandbox::new();
  seed(&sb.catalog, 1).await;

  let created = sb
    .catalog
    .create(form("7", "Silla"), Some(png("silla.png")), Some(glb("silla.glb")))
    .await
    .unwrap();

  assert_eq!(created.id, 7);
  assert_eq!(created.imagen, "Vista_previa/silla.png");
  assert_eq!(created.archivo_3d, "Modelos/silla.glb");
  assert!(sb.root().join("Vista_previa/silla.png").exists());
  assert!(sb.root().join("Modelos/silla.glb").exists());

  let listed = sb.catalog.list().await;
  assert_eq!(listed.len(), 2);
  assert_eq!(listed.iter().filter(|p| p.id == 7).count(), 1);
}

#[tokio::test]
async fn test_duplicate_id_is_a_conflict_and_store_is_unchanged() {
  setup_tracing();
  let sb = Sandbox::new();
  seed(&sb.catalog, 3).await;
  let before = tokio::fs::read(sb.products_file()).await.unwrap();

  let result = sb
    .catalog
    .create(form("3", "Otra"), Some(png("otra.png")), Some(glb("otra.glb")))
    .await;

  assert!(matches!(result, Err(CatalogError::Conflict(_))));
  let after = tokio::fs::read(sb.products_file()).await.unwrap();
  assert_eq!(before, after);
  // Files are only written once the id is known to be free.
  assert!(!sb.root().join("Vista_previa/otra.png").exists());
}

#[tokio::test]
async fn test_missing_fields_are_rejected() {
  setup_tracing();
  let sb = Sandbox::new();

  let mut incomplete = form("4", "Mesa");
  incomplete.precio = None;
  let result = sb.catalog.create(incomplete, Some(png("m.png")), Some(glb("m.glb"))).await;
  assert!(matches!(result, Err(CatalogError::Validation(ref m)) if m == "Todos los campos son requeridos"));

  let mut blank = form("4", "Mesa");
  blank.categoria = Some("   ".into());
  let result = sb.catalog.create(blank, Some(png("m.png")), Some(glb("m.glb"))).await;
  assert!(matches!(result, Err(CatalogError::Validation(_))));

  assert!(sb.catalog.list().await.is_empty());
}

#[tokio::test]
async fn test_missing_attachments_are_rejected() {
  setup_tracing();
  let sb = Sandbox::new();

  let no_model = sb.catalog.create(form("4", "Mesa"), Some(png("m.png")), None).await;
  let no_image = sb.catalog.create(form("4", "Mesa"), None, Some(glb("m.glb"))).await;

  for result in [no_model, no_image] {
    match result {
      Err(CatalogError::Validation(m)) => assert_eq!(m, "Se requieren tanto la imagen como el archivo 3D"),
      other => panic!("Expected validation error, got {:?}", other),
    }
  }
}

#[tokio::test]
async fn test_wrong_file_kinds_are_rejected() {
  setup_tracing();
  let sb = Sandbox::new();

  let not_image = UploadedFile::new("m.png", Some("application/pdf".into()), vec![1]);
  let result = sb.catalog.create(form("4", "Mesa"), Some(not_image), Some(glb("m.glb"))).await;
  assert!(matches!(result, Err(CatalogError::Validation(_))));

  let not_glb = UploadedFile::new("m.obj", None, vec![1]);
  let result = sb.catalog.create(form("4", "Mesa"), Some(png("m.png")), Some(not_glb)).await;
  assert!(matches!(result, Err(CatalogError::Validation(ref m)) if m.contains(".glb")));
}

#[tokio::test]
async fn test_non_numeric_or_zero_id_is_rejected() {
  setup_tracing();
  let sb = Sandbox::new();
  for bad in ["abc", "0", "-3", "4.5"] {
    let result = sb.catalog.create(form(bad, "Mesa"), Some(png("m.png")), Some(glb("m.glb"))).await;
    assert!(
      matches!(result, Err(CatalogError::Validation(_))),
      "id {:?} should be rejected",
      bad
    );
  }
}

#[tokio::test]
async fn test_configured_model_extension_is_enforced() {
  setup_tracing();
  let dir = tempfile::tempdir().unwrap();
  let catalog = Catalog::new(
    icaro::JsonProductStore::new(dir.path().join("productos.json")),
    UploadLayout::new(dir.path(), "img", "mdl", ".gltf"),
  );

  let result = catalog.create(form("1", "A"), Some(png("a.png")), Some(glb("a.glb"))).await;
  assert!(matches!(result, Err(CatalogError::Validation(_))));

  let gltf = UploadedFile::new("a.gltf", None, b"{}".to_vec());
  let created = catalog.create(form("1", "A"), Some(png("a.png")), Some(gltf)).await.unwrap();
  assert_eq!(created.archivo_3d, "mdl/a.gltf");
  assert_eq!(created.imagen, "img/a.png");
}

#[tokio::test]
async fn test_delete_removes_record_and_files() {
  setup_tracing();
  let sb = Sandbox::new();
  seed(&sb.catalog, 1).await;
  seed(&sb.catalog, 2).await;

  let removed = sb.catalog.delete(1).await.unwrap();
  assert_eq!(removed.id, 1);
  assert!(!sb.root().join(&removed.imagen).exists());
  assert!(!sb.root().join(&removed.archivo_3d).exists());

  let ids: Vec<u32> = sb.catalog.list().await.iter().map(|p| p.id).collect();
  assert_eq!(ids, vec![2]);
}

#[tokio::test]
async fn test_delete_unknown_id_is_not_found_and_store_is_unchanged() {
  setup_tracing();
  let sb = Sandbox::new();
  seed(&sb.catalog, 5).await;
  let before = tokio::fs::read(sb.products_file()).await.unwrap();

  let result = sb.catalog.delete(6).await;
  assert!(matches!(result, Err(CatalogError::NotFound(_))));
  assert_eq!(tokio::fs::read(sb.products_file()).await.unwrap(), before);
}

#[tokio::test]
async fn test_delete_proceeds_when_files_are_already_gone() {
  setup_tracing();
  let sb = Sandbox::new();
  let product = seed(&sb.catalog, 9).await;
  tokio::fs::remove_file(sb.root().join(&product.imagen)).await.unwrap();
  tokio::fs::remove_file(sb.root().join(&product.archivo_3d)).await.unwrap();

  sb.catalog.delete(9).await.unwrap();
  assert!(sb.catalog.list().await.is_empty());
}

#[tokio::test]
async fn test_failed_save_surfaces_storage_error_and_keeps_previous_state() {
  setup_tracing();
  let dir = tempfile::tempdir().unwrap();
  let store = FlakyStore::default();
  let catalog = Catalog::new(store.clone(), UploadLayout::with_defaults(dir.path()));
  seed(&catalog, 1).await;

  store.failing(true);
  let created = catalog
    .create(form("2", "B"), Some(png("b.png")), Some(glb("b.glb")))
    .await;
  assert!(matches!(created, Err(CatalogError::Storage { .. })));
  // No rollback of relocated files.
  assert!(dir.path().join("Vista_previa/b.png").exists());

  let deleted = catalog.delete(1).await;
  assert!(matches!(deleted, Err(CatalogError::Storage { .. })));

  let ids: Vec<u32> = store.snapshot().iter().map(|p| p.id).collect();
  assert_eq!(ids, vec![1]);
}

#[tokio::test]
async fn test_available_ids_follow_store_state() {
  setup_tracing();
  let sb = Sandbox::new();
  for id in [1, 2, 4] {
    seed(&sb.catalog, id).await;
  }

  let allocation = sb.catalog.available_ids().await;
  assert_eq!(allocation.occupied, vec![1, 2, 4]);
  assert_eq!(allocation.total, 3);
  assert_eq!(allocation.available.len(), 20);
  assert_eq!(&allocation.available[..4], &[3, 5, 6, 7]);
  assert!(allocation.available.windows(2).all(|w| w[0] < w[1]));
  assert!(allocation.available.iter().all(|id| !allocation.occupied.contains(id)));

  sb.catalog.delete(2).await.unwrap();
  let allocation = sb.catalog.available_ids().await;
  assert_eq!(&allocation.available[..3], &[2, 3, 5]);
}

#[tokio::test]
async fn test_malformed_document_reads_as_empty() {
  setup_tracing();
  let sb = Sandbox::new();
  tokio::fs::create_dir_all(sb.root().join("Data")).await.unwrap();
  tokio::fs::write(sb.products_file(), b"{ not json").await.unwrap();

  assert!(sb.catalog.list().await.is_empty());
  assert_eq!(sb.catalog.available_ids().await.total, 0);
}

#[tokio::test]
async fn test_unreadable_record_blocks_writes_instead_of_wiping_neighbours() {
  setup_tracing();
  let sb = Sandbox::new();
  tokio::fs::create_dir_all(sb.root().join("Data")).await.unwrap();
  let document = serde_json::json!({ "productos": [
    { "id": 1, "nombre": "Silla", "categoria": "Muebles", "descripcion": "Roble", "precio": "10",
      "imagen": "Vista_previa/silla.png", "archivo_3d": "Modelos/silla.glb" },
    { "id": 2, "nombre": "Mesa", "categoria": "Muebles", "precio": "20",
      "imagen": "Vista_previa/mesa.png", "archivo_3d": "Modelos/mesa.glb" }
  ]});
  let original = serde_json::to_vec_pretty(&document).unwrap();
  tokio::fs::write(sb.products_file(), &original).await.unwrap();

  let listed = sb.catalog.list().await;
  assert_eq!(listed.iter().map(|p| p.id).collect::<Vec<_>>(), vec![1]);

  let created = sb
    .catalog
    .create(form("5", "Lampara"), Some(png("lampara.png")), Some(glb("lampara.glb")))
    .await;
  assert!(matches!(created, Err(CatalogError::Storage { .. })));
  assert!(!sb.root().join("Vista_previa/lampara.png").exists());

  assert!(matches!(sb.catalog.delete(1).await, Err(CatalogError::Storage { .. })));

  let on_disk = tokio::fs::read(sb.products_file()).await.unwrap();
  assert_eq!(on_disk, original);
}

#[tokio::test]
async fn test_get_finds_single_product() {
  setup_tracing();
  let sb = Sandbox::new();
  seed(&sb.catalog, 12).await;

  assert_eq!(sb.catalog.get(12).await.unwrap().nombre, "Producto 12");
  assert!(matches!(sb.catalog.get(13).await, Err(CatalogError::NotFound(_))));
}

#[tokio::test]
async fn test_form_fields_assigned_by_name() {
  let mut form = NewProductForm::default();
  for (name, value) in [("nombre", "A"), ("categoria", "B"), ("descripcion", "C"), ("precio", "1"), ("id", "3")] {
    form.set_field(name, value.to_string());
  }
  let sb = Sandbox::new();
  let created = sb.catalog.create(form, Some(png("a.png")), Some(glb("a.glb"))).await.unwrap();
  assert_eq!(created.precio, "1");
}

/// End-to-end flows through the dashboard state, the reqwest client and a
/// mocked catalog service.
use anyhow::Result;
use std::sync::Arc;

use chem_catalog_core::api::endpoints;
use chem_catalog_core::{FormEvent, ListStatus, ProductField};
use chem_catalog_ui::{CatalogStateManager, FormTarget};
use test_harness::fixtures::complete_draft;
use test_harness::{body_text, MockCatalogServer, TestHarness};

use crate::test_utils::settle;

fn fill_create(state: &mut CatalogStateManager) {
    let draft = complete_draft();
    for field in ProductField::REQUIRED {
        state.handle_form_event(FormTarget::Create, FormEvent::Changed(field, draft.text(field).to_string()));
    }
}

#[tokio::test]
async fn dashboard_loads_and_adds_a_product() -> Result<()> {
    let harness = TestHarness::setup().await?;
    harness
        .server
        .mount_create_success("6650b9", None, Some("https://files.example.com/acetone_tds.pdf"))
        .await;

    let mut state = CatalogStateManager::new(Arc::new(harness.client()));
    state.ensure_loaded();
    settle(&mut state).await;
    assert_eq!(state.view.status(), &ListStatus::Loaded);
    assert_eq!(state.store.len(), harness.fixtures.products.len());

    state.open_create();
    settle(&mut state).await;
    assert_eq!(state.create_form.categories().len(), 3);

    fill_create(&mut state);
    settle(&mut state).await;
    let subs: Vec<_> = state.create_form.sub_categories().iter().map(|s| s.name.as_str()).collect();
    assert_eq!(subs, ["Alcohols", "Ketones"]);

    let dir = tempfile::tempdir()?;
    let tds = dir.path().join("acetone_tds.pdf");
    std::fs::write(&tds, b"%PDF-1.7 acetone")?;
    state.handle_form_event(FormTarget::Create, FormEvent::FileSelected(ProductField::Tds, tds));
    state.handle_form_event(FormTarget::Create, FormEvent::Submit);
    settle(&mut state).await;

    assert!(!state.view.create().is_open());
    assert!(state.view.create().api_error().is_none());

    let requests = harness.server.received_on(endpoints::ADD_PRODUCT).await;
    assert_eq!(requests.len(), 1);
    let body = body_text(&requests[0]);
    assert!(body.contains("name=\"subCategory\""));
    assert!(body.contains("Ketones"));
    assert!(body.contains("filename=\"acetone_tds.pdf\""));
    assert!(body.contains("%PDF-1.7 acetone"));

    // The refresh after a create hits the list endpoint a second time.
    assert_eq!(harness.server.received_on(endpoints::LIST_PRODUCTS).await.len(), 2);
    Ok(())
}

#[tokio::test]
async fn server_rejection_is_shown_in_the_add_dialog() -> Result<()> {
    let harness = TestHarness::setup().await?;
    harness.server.mount_create_rejection(409, "CAS exists").await;

    let mut state = CatalogStateManager::new(Arc::new(harness.client()));
    state.ensure_loaded();
    state.open_create();
    settle(&mut state).await;
    fill_create(&mut state);
    settle(&mut state).await;
    state.submit(FormTarget::Create);
    settle(&mut state).await;

    assert!(state.view.create().is_open());
    assert_eq!(state.view.create().api_error(), Some("CAS exists"));
    assert_eq!(state.store.len(), harness.fixtures.products.len());
    Ok(())
}

#[tokio::test]
async fn edit_posts_to_the_record_and_refreshes() -> Result<()> {
    let harness = TestHarness::setup().await?;
    let target = harness.fixtures.products[1].clone();
    harness.server.mount_update_success(&target.id).await;

    let mut state = CatalogStateManager::new(Arc::new(harness.client()));
    state.ensure_loaded();
    settle(&mut state).await;

    state.open_edit(&target.id);
    settle(&mut state).await;
    assert_eq!(state.view.update().draft().cas, target.cas);

    state.handle_form_event(
        FormTarget::Edit,
        FormEvent::Changed(ProductField::Cas, "64-19-7 ".to_string()),
    );
    state.handle_form_event(FormTarget::Edit, FormEvent::Submit);
    settle(&mut state).await;

    assert!(!state.view.update().is_open());
    let route = format!("{}/{}", endpoints::UPDATE_PRODUCT, target.id);
    let requests = harness.server.received_on(&route).await;
    assert_eq!(requests.len(), 1);
    let body = body_text(&requests[0]);
    assert!(body.contains("\r\n\r\n64-19-7\r\n"));
    assert!(body.contains("https://files.example.com/acetic_acid_sds.pdf"));
    assert_eq!(harness.server.received_on(endpoints::LIST_PRODUCTS).await.len(), 2);
    Ok(())
}

#[tokio::test]
async fn delete_removes_the_row_after_the_service_confirms() -> Result<()> {
    let harness = TestHarness::setup().await?;
    harness.server.mount_delete_success("6650a1").await;

    let mut state = CatalogStateManager::new(Arc::new(harness.client()));
    state.ensure_loaded();
    settle(&mut state).await;

    state.request_delete("6650a1");
    state.confirm_delete();
    settle(&mut state).await;

    assert!(state.store.get("6650a1").is_none());
    assert_eq!(state.store.len(), 2);
    assert_eq!(state.view.notice(), Some("Deleted Ethanol"));
    Ok(())
}

#[tokio::test]
async fn failed_list_load_recovers_on_retry() -> Result<()> {
    test_harness::init_tracing();
    let server = MockCatalogServer::start().await;
    server.mount_plain_error("GET", endpoints::LIST_PRODUCTS, 500).await;

    let mut state = CatalogStateManager::new(Arc::new(server.client()));
    state.ensure_loaded();
    settle(&mut state).await;
    assert_eq!(
        state.view.status(),
        &ListStatus::Failed("Failed to load products".to_string())
    );
    assert!(state.store.is_empty());

    server.server().reset().await;
    server.mount_products(&test_harness::fixtures::sample_products()).await;
    state.reload();
    settle(&mut state).await;

    assert_eq!(state.view.status(), &ListStatus::Loaded);
    assert_eq!(state.store.len(), 3);
    Ok(())
}

//! End-to-end wizard tests
//!
//! The wizard runs against a file-backed session and either the in-process
//! backend or a REST server spawned on an ephemeral port.

use std::path::Path;

use tempfile::TempDir;

use leadcollect::client::{Backend, BackendError, HttpBackend, LocalBackend};
use leadcollect::config::Config;
use leadcollect::models::ImageFile;
use leadcollect::rest::{build_router, state::build_service, ApiState};
use leadcollect::session::{FileKeyValueStore, SessionState, Step, SubmissionBlocked};
use leadcollect::wizard::{ProductForm, SellerForm, Wizard, WizardError};

fn test_config(dir: &Path) -> Config {
    let root = dir.to_string_lossy().to_string();
    let mut config = Config::default();
    config.paths.state = format!("{}/state", root);
    config.paths.database = format!("{}/leads.db", root);
    config.paths.uploads = format!("{}/uploads", root);
    config.capacity.minimum = 2;
    config.capacity.maximum = 3;
    config
}

fn write_image(dir: &Path, name: &str) -> ImageFile {
    let path = dir.join(name);
    std::fs::write(&path, [0x89, 0x50, 0x4e, 0x47, 0x0d, 0x0a, 0x1a, 0x0a]).unwrap();
    ImageFile::read(&path).unwrap()
}

fn seller_form(dir: &Path) -> SellerForm {
    SellerForm {
        name: "Corner Store".to_string(),
        phone: "9123456780".to_string(),
        gst_number: "22AAAAA0000A1Z5".to_string(),
        shop_image: write_image(dir, "shop.png"),
    }
}

fn product_form(dir: &Path, name: &str, mrp: f64, msp: f64) -> ProductForm {
    ProductForm {
        name: name.to_string(),
        mrp,
        msp,
        front_image: write_image(dir, "front.png"),
        side_image: write_image(dir, "side.jpg"),
        back_image: write_image(dir, "back.webp"),
    }
}

fn open<B: Backend>(config: &Config, backend: B) -> Wizard<B, FileKeyValueStore> {
    Wizard::open(
        backend,
        FileKeyValueStore::new(config.state_path()),
        config.capacity().unwrap(),
    )
    .unwrap()
}

fn local(config: &Config) -> LocalBackend {
    LocalBackend::new(build_service(config).unwrap())
}

#[tokio::test]
async fn test_full_flow_with_local_backend() {
    let dir = TempDir::new().unwrap();
    let config = test_config(dir.path());
    let backend = local(&config);
    let service = backend.service().clone();
    let mut wizard = open(&config, backend);

    wizard.authenticate("Alice", "9876543210").await.unwrap();
    let seller = wizard.create_seller(seller_form(dir.path())).await.unwrap();
    wizard
        .add_product(product_form(dir.path(), "Rice", 100.0, 90.0))
        .await
        .unwrap();
    wizard
        .add_product(product_form(dir.path(), "Dal", 80.0, 75.0))
        .await
        .unwrap();

    let receipt = wizard.submit().await.unwrap();
    assert_eq!(receipt.count, 2);
    assert_eq!(wizard.state(), &SessionState::initial());

    let stored = service
        .list_products(seller.id.unwrap())
        .await
        .unwrap();
    assert_eq!(stored.len(), 2);
    assert!(stored
        .iter()
        .all(|p| p.front_image.contains("/uploads/products/")));
}

#[tokio::test]
async fn test_session_survives_restart() {
    let dir = TempDir::new().unwrap();
    let config = test_config(dir.path());

    {
        let mut wizard = open(&config, local(&config));
        wizard.authenticate("Alice", "9876543210").await.unwrap();
        wizard.create_seller(seller_form(dir.path())).await.unwrap();
        wizard
            .add_product(product_form(dir.path(), "Rice", 100.0, 90.0))
            .await
            .unwrap();
    }

    let mut wizard = open(&config, local(&config));
    assert_eq!(wizard.state().current_step, Step::Products);
    assert_eq!(wizard.state().products.len(), 1);
    assert!(wizard.session().is_authenticated());

    let err = wizard.submit().await.unwrap_err();
    assert!(matches!(
        err,
        WizardError::Blocked(SubmissionBlocked::NotEnoughProducts { have: 1, minimum: 2 })
    ));

    wizard
        .add_product(product_form(dir.path(), "Dal", 80.0, 75.0))
        .await
        .unwrap();
    wizard.submit().await.unwrap();
}

#[tokio::test]
async fn test_rejected_submission_keeps_session() {
    let dir = TempDir::new().unwrap();
    let config = test_config(dir.path());
    let mut wizard = open(&config, local(&config));

    wizard.authenticate("Alice", "9876543210").await.unwrap();
    wizard.create_seller(seller_form(dir.path())).await.unwrap();
    wizard
        .add_product(product_form(dir.path(), "Rice", 100.0, 90.0))
        .await
        .unwrap();
    wizard
        .add_product(product_form(dir.path(), "R", 100.0, 90.0))
        .await
        .unwrap();

    let err = wizard.submit().await.unwrap_err();
    match err {
        WizardError::Backend(BackendError::Rejected { status, error, .. }) => {
            assert_eq!(status, 400);
            assert_eq!(error, "validation_error");
        }
        other => panic!("unexpected error {:?}", other),
    }
    assert!(!wizard.state().is_submitting);
    assert_eq!(wizard.state().products.len(), 2);

    wizard.remove_product(1).unwrap();
    wizard
        .add_product(product_form(dir.path(), "Ragi", 100.0, 90.0))
        .await
        .unwrap();
    wizard.submit().await.unwrap();
}

#[tokio::test]
async fn test_full_flow_over_http() {
    let dir = TempDir::new().unwrap();
    let mut config = test_config(dir.path());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    config.api.base_url = format!("http://{}", addr);

    let state = ApiState::from_config(config.clone()).unwrap();
    let server = tokio::spawn(async move {
        axum::serve(listener, build_router(state)).await.unwrap();
    });

    let backend = HttpBackend::from_config(&config).unwrap();
    let mut wizard = open(&config, backend);

    let user = wizard.authenticate("Alice", "9876543210").await.unwrap();
    assert!(user.id.is_some());

    let seller = wizard.create_seller(seller_form(dir.path())).await.unwrap();
    assert!(seller
        .shop_image
        .as_deref()
        .unwrap()
        .starts_with(&format!("http://{}/uploads/shops/", addr)));

    wizard
        .add_product(product_form(dir.path(), "Rice", 100.0, 90.0))
        .await
        .unwrap();
    wizard
        .add_product(product_form(dir.path(), "Dal", 80.0, 75.0))
        .await
        .unwrap();
    let receipt = wizard.submit().await.unwrap();
    assert_eq!(receipt.message, "Products created successfully");
    assert_eq!(receipt.count, 2);

    let hosted = reqwest::get(&receipt.products[0].front_image).await.unwrap();
    assert!(hosted.status().is_success());

    server.abort();
}

#[tokio::test]
async fn test_http_rejection_carries_details() {
    let dir = TempDir::new().unwrap();
    let mut config = test_config(dir.path());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    config.api.base_url = format!("http://{}", listener.local_addr().unwrap());

    let state = ApiState::from_config(config.clone()).unwrap();
    let server = tokio::spawn(async move {
        axum::serve(listener, build_router(state)).await.unwrap();
    });

    let mut wizard = open(&config, HttpBackend::from_config(&config).unwrap());
    wizard.authenticate("Alice", "9876543210").await.unwrap();

    let mut form = seller_form(dir.path());
    form.gst_number = "NOT-A-GST".to_string();
    let err = wizard.create_seller(form).await.unwrap_err();
    match err {
        WizardError::Backend(BackendError::Rejected {
            status, details, ..
        }) => {
            assert_eq!(status, 400);
            assert_eq!(details.unwrap()[0]["field"], "gstNumber");
        }
        other => panic!("unexpected error {:?}", other),
    }
    assert_eq!(wizard.state().current_step, Step::Seller);

    server.abort();
}

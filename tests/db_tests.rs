use anyhow::Result;
use storefront::db::*;
use tempfile::TempDir;

/// Open a fresh catalog in a temporary directory
async fn setup_test_db() -> Result<(CatalogStore, TempDir)> {
    let dir = tempfile::tempdir()?;
    let url = format!("sqlite://{}", dir.path().join("catalog.db").display());

    let store = CatalogStore::connect(&url).await?;
    store.init_schema().await?;

    Ok((store, dir))
}

#[tokio::test]
async fn test_seed_then_list_returns_seeded_set_in_order() -> Result<()> {
    let (store, _dir) = setup_test_db().await?;

    let inserted = store.seed_if_empty().await?;
    assert_eq!(inserted, 2);

    let products = store.try_list_products().await?;
    let expected = sample_products();
    assert_eq!(products.len(), expected.len());

    for (product, sample) in products.iter().zip(expected.iter()) {
        assert_eq!(product.name, sample.name);
        assert_eq!(product.description, sample.description);
        assert_eq!(product.price, sample.price);
        assert_eq!(product.image_url, sample.image_url);
    }
    assert!(products[0].id < products[1].id);

    Ok(())
}

#[tokio::test]
async fn test_seed_is_idempotent() -> Result<()> {
    let (store, _dir) = setup_test_db().await?;

    assert_eq!(store.seed_if_empty().await?, 2);
    assert_eq!(store.seed_if_empty().await?, 0);
    assert_eq!(store.try_list_products().await?.len(), 2);

    Ok(())
}

#[tokio::test]
async fn test_seed_skips_non_empty_catalog() -> Result<()> {
    let (store, _dir) = setup_test_db().await?;

    store
        .insert_product(&NewProduct::new("Headphones", "Noise cancelling.", 150.0, None))
        .await?;

    assert_eq!(store.seed_if_empty().await?, 0);

    let products = store.list_products().await;
    assert_eq!(products.len(), 1);
    assert_eq!(products[0].name, "Headphones");
    assert_eq!(products[0].image_url, None);

    Ok(())
}

#[tokio::test]
async fn test_seed_survives_reopen() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let url = format!("sqlite://{}", dir.path().join("catalog.db").display());

    let first = CatalogStore::connect(&url).await?;
    first.init_schema().await?;
    assert_eq!(first.seed_if_empty().await?, 2);
    first.close().await;

    let second = CatalogStore::connect(&url).await?;
    second.init_schema().await?;
    assert_eq!(second.seed_if_empty().await?, 0);
    assert_eq!(second.list_products().await.len(), 2);

    Ok(())
}

#[tokio::test]
async fn test_insert_product_returns_increasing_ids() -> Result<()> {
    let (store, _dir) = setup_test_db().await?;

    let first = store
        .insert_product(&NewProduct::new("Mouse", "Wireless.", 25.5, None))
        .await?;
    let second = store
        .insert_product(&NewProduct::new("Keyboard", "Mechanical.", 89.99, Some("https://example.com/kb.png")))
        .await?;
    assert!(second > first);

    let products = store.try_list_products().await?;
    assert_eq!(products[0].id, first);
    assert_eq!(products[1].image_url.as_deref(), Some("https://example.com/kb.png"));

    Ok(())
}

#[tokio::test]
async fn test_empty_catalog_lists_nothing() -> Result<()> {
    let (store, _dir) = setup_test_db().await?;

    assert!(store.try_list_products().await?.is_empty());
    assert!(store.list_products().await.is_empty());

    Ok(())
}

#[tokio::test]
async fn test_unavailable_store_reads_as_empty() -> Result<()> {
    let (store, _dir) = setup_test_db().await?;
    store.seed_if_empty().await?;

    store.close().await;

    assert!(store.try_list_products().await.is_err());
    assert!(store.list_products().await.is_empty());

    Ok(())
}

#[tokio::test]
async fn test_missing_table_reads_as_empty() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let url = format!("sqlite://{}", dir.path().join("catalog.db").display());

    // No init_schema: the products table does not exist
    let store = CatalogStore::connect(&url).await?;

    assert!(store.try_list_products().await.is_err());
    assert!(store.list_products().await.is_empty());

    Ok(())
}

#[tokio::test]
async fn test_connect_lazy_rejects_invalid_url() {
    assert!(CatalogStore::connect_lazy("sqlite://catalog.db?flavour=strawberry").is_err());
}

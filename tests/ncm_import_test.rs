use achei_meu_frete::db;
use achei_meu_frete::import::{RawNcmRecord, canonicalize};
use achei_meu_frete::services::ncm_service;
use sea_orm::DatabaseConnection;

// Helper to create a test database
async fn setup_test_db() -> DatabaseConnection {
    // In-memory SQLite for testing
    db::init_db("sqlite::memory:")
        .await
        .expect("Failed to init DB")
}

fn raw(codigo: &str, descricao: &str) -> RawNcmRecord {
    RawNcmRecord {
        codigo: codigo.to_string(),
        descricao: Some(descricao.to_string()),
    }
}

#[tokio::test]
async fn import_dedupes_and_filters_codes() {
    let db = setup_test_db().await;

    let records = canonicalize(vec![
        raw("0101.20.00", "Cavalos vivos"),
        raw("01012000", "Duplicata que deve ser ignorada"),
        raw("0101", "Código curto demais"),
        raw("ABC12345", "Código não numérico"),
        raw("0201.10.00", "Carnes de bovino, frescas"),
    ]);

    let imported = ncm_service::import_ncms(&db, &records)
        .await
        .expect("import failed");

    assert_eq!(imported, 2);
    assert_eq!(ncm_service::count_ncms(&db, &[]).await.unwrap(), 2);

    // First occurrence wins for duplicated codes
    let ncm = ncm_service::get_by_code(&db, "01012000").await.unwrap();
    assert_eq!(ncm.description, "Cavalos vivos");
}

#[tokio::test]
async fn import_is_idempotent() {
    let db = setup_test_db().await;

    let records = canonicalize(vec![
        raw("0101.20.00", "Animais vivos da espécie cavalar"),
        raw("2202.10.00", "Bebidas não alcoólicas"),
    ]);

    ncm_service::import_ncms(&db, &records)
        .await
        .expect("first import failed");
    let first = ncm_service::list_all(&db).await.unwrap();

    ncm_service::import_ncms(&db, &records)
        .await
        .expect("second import failed");
    let second = ncm_service::list_all(&db).await.unwrap();

    assert_eq!(first, second);
}

#[tokio::test]
async fn reimport_overwrites_description_and_tags() {
    let db = setup_test_db().await;

    let before = canonicalize(vec![raw("0201.10.00", "Parafusos de aço inoxidável")]);
    ncm_service::import_ncms(&db, &before).await.unwrap();

    let ncm = ncm_service::get_by_code(&db, "02011000").await.unwrap();
    assert!(ncm.tags.is_empty());

    let after = canonicalize(vec![raw("0201.10.00", "Carnes de bovino, frescas")]);
    ncm_service::import_ncms(&db, &after).await.unwrap();

    assert_eq!(ncm_service::count_ncms(&db, &[]).await.unwrap(), 1);

    let ncm = ncm_service::get_by_code(&db, "02011000").await.unwrap();
    assert_eq!(ncm.description, "Carnes de bovino, frescas");
    assert_eq!(ncm.classification, "Carnes de bovino, frescas");
    assert_eq!(ncm.tags, vec!["perishable"]);
}

#[tokio::test]
async fn search_matches_code_prefix_and_description() {
    let db = setup_test_db().await;

    let records = canonicalize(vec![
        raw("01012000", "Animais vivos da espécie cavalar"),
        raw("01013000", "Asininos vivos"),
        raw("02011000", "Carnes de bovino, frescas"),
        raw("85011000", "Motor Elétrico de corrente contínua"),
    ]);
    ncm_service::import_ncms(&db, &records).await.unwrap();

    // Code prefix, any order
    let mut codes: Vec<String> = ncm_service::search_ncms(&db, "0101", None)
        .await
        .unwrap()
        .into_iter()
        .map(|n| n.code)
        .collect();
    codes.sort();
    assert_eq!(codes, vec!["01012000", "01013000"]);

    // Case-insensitive description substring
    let hits = ncm_service::search_ncms(&db, "motor", None).await.unwrap();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].code, "85011000");

    // Below the minimum query length
    assert!(
        ncm_service::search_ncms(&db, "010", None)
            .await
            .unwrap()
            .is_empty()
    );
}

#[tokio::test]
async fn search_respects_limit_clamp() {
    let db = setup_test_db().await;

    let raw_records: Vec<RawNcmRecord> = (0..60)
        .map(|i| raw(&format!("010190{:02}", i), "Outros animais vivos"))
        .collect();
    ncm_service::import_ncms(&db, &canonicalize(raw_records))
        .await
        .unwrap();

    let hits = ncm_service::search_ncms(&db, "0101", Some(1000)).await.unwrap();
    assert_eq!(hits.len(), 50);

    let hits = ncm_service::search_ncms(&db, "0101", None).await.unwrap();
    assert_eq!(hits.len(), 20);

    let hits = ncm_service::search_ncms(&db, "0101", Some(5)).await.unwrap();
    assert_eq!(hits.len(), 5);
}

#[tokio::test]
async fn tag_queries_only_return_matching_records() {
    let db = setup_test_db().await;

    let records = canonicalize(vec![
        raw("01012000", "Animais vivos da espécie cavalar"),
        raw("02011000", "Carnes de bovino, frescas"),
        raw("84073100", "Motores de pistão alternativo"),
    ]);
    ncm_service::import_ncms(&db, &records).await.unwrap();

    let perishable = ncm_service::list_ncms(&db, &["perishable".to_string()], None)
        .await
        .unwrap();
    assert_eq!(perishable.len(), 1);
    assert_eq!(perishable[0].code, "02011000");
    assert!(perishable[0].tags.contains(&"perishable".to_string()));

    // Intersection with any of the candidates
    let tags = vec!["perishable".to_string(), "live_animal".to_string()];
    let mut codes: Vec<String> = ncm_service::list_ncms(&db, &tags, None)
        .await
        .unwrap()
        .into_iter()
        .map(|n| n.code)
        .collect();
    codes.sort();
    assert_eq!(codes, vec!["01012000", "02011000"]);

    assert_eq!(ncm_service::count_ncms(&db, &tags).await.unwrap(), 2);
    assert_eq!(ncm_service::count_ncms(&db, &[]).await.unwrap(), 3);
}

#[tokio::test]
async fn first_ncm_exposes_data_shape() {
    let db = setup_test_db().await;

    assert!(ncm_service::first_ncm(&db).await.unwrap().is_none());

    let records = canonicalize(vec![raw("01012000", "Animais vivos")]);
    ncm_service::import_ncms(&db, &records).await.unwrap();

    let ncm = ncm_service::first_ncm(&db)
        .await
        .unwrap()
        .expect("expected a record");
    assert_eq!(ncm.code, "01012000");
    assert_eq!(ncm.classification, ncm.description);
}

#[tokio::test]
async fn get_by_code_reports_missing_records() {
    let db = setup_test_db().await;

    let err = ncm_service::get_by_code(&db, "99999999").await.unwrap_err();
    assert!(matches!(err, ncm_service::ServiceError::NotFound));
}

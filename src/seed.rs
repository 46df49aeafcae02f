use sea_orm::DatabaseConnection;

use crate::import::{RawNcmRecord, canonicalize};
use crate::services::ncm_service::{self, ServiceError};

/// Seed a small NCM sample so the marketplace screens have data to search
/// against without running a full MERCOSUL feed import.
pub async fn seed_demo_data(db: &DatabaseConnection) -> Result<(), ServiceError> {
    let raw = vec![
        demo("0101.21.00", "Cavalos vivos, reprodutores de raça pura"),
        demo(
            "0102.21.10",
            "Animais vivos da espécie bovina, prenhes ou com cria ao pé",
        ),
        demo(
            "0201.30.00",
            "Carnes desossadas de bovino, frescas ou refrigeradas",
        ),
        demo(
            "2202.10.00",
            "Águas gaseificadas, adicionadas de açúcar, e outras bebidas não alcoólicas",
        ),
        demo("2804.40.00", "Oxigênio (gás para uso industrial ou medicinal)"),
        demo("3602.00.00", "Explosivos preparados, exceto pólvoras propulsivas"),
        demo(
            "7010.90.00",
            "Garrafões, garrafas e frascos de vidro frágil, para transporte ou embalagem",
        ),
        demo(
            "8407.31.00",
            "Motores de pistão alternativo, de cilindrada não superior a 50 cm³",
        ),
    ];

    let records = canonicalize(raw);
    let count = ncm_service::import_ncms(db, &records).await?;

    tracing::info!("Seeded {} demo NCMs", count);

    Ok(())
}

fn demo(codigo: &str, descricao: &str) -> RawNcmRecord {
    RawNcmRecord {
        codigo: codigo.to_string(),
        descricao: Some(descricao.to_string()),
    }
}

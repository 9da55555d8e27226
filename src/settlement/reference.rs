use chrono::Utc;
use uuid::Uuid;

/// Generates a human-facing reference number: `TXN-<UTC date>-<8 hex chars>`.
///
/// Uniqueness is best-effort. The random suffix makes same-day collisions
/// overwhelmingly unlikely but nothing enforces it, which is why the store
/// keys records by id and treats the reference as a label.
pub fn generate_reference_number() -> String {
    let date = Utc::now().format("%Y%m%d");
    let suffix = Uuid::new_v4().simple().to_string();
    format!("TXN-{}-{}", date, &suffix[..8])
}

//! SQLite schema definition.

/// Complete database schema for pillbox.
pub const SCHEMA: &str = r#"
-- ============================================================================
-- Key-value slots
-- ============================================================================

-- Each slot holds one serialized document, replaced wholesale on write.
CREATE TABLE IF NOT EXISTS kv_store (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL,
    updated_at TEXT NOT NULL DEFAULT (datetime('now'))
);
"#;

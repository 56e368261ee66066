//! Command implementations
//!
//! One function per subcommand, plus `open_db` which every command that
//! touches storage goes through.

use std::path::Path;

use anyhow::{Context, Result};
use centavo_core::ai::{AIBackend, AIClient};
use centavo_core::db::Database;
use centavo_core::{
    build_breakdown, categories, compute_metrics, generate_insight, normalize, Trend,
};

/// Open database with encryption by default, or unencrypted if --no-encrypt
pub fn open_db(db_path: &Path, no_encrypt: bool) -> Result<Database> {
    let path_str = db_path.to_str().unwrap();
    if no_encrypt {
        Database::new_unencrypted(path_str).context("Failed to open database (unencrypted)")
    } else {
        Database::new(path_str).context("Failed to open database")
    }
}

pub fn cmd_init(db_path: &Path, no_encrypt: bool) -> Result<()> {
    println!("🔧 Initializing database at {}...", db_path.display());

    let _db = open_db(db_path, no_encrypt)?;

    if no_encrypt {
        println!("   ⚠️  Encryption: DISABLED (--no-encrypt)");
    } else {
        println!("   🔒 Encryption: ENABLED");
    }

    println!("✅ Database initialized successfully!");
    println!();
    println!("Next steps:");
    println!("  1. Load demo data: centavo seed");
    println!("  2. Start the server: centavo serve");

    Ok(())
}

pub fn cmd_seed(db_path: &Path, no_encrypt: bool) -> Result<()> {
    let db = open_db(db_path, no_encrypt)?;

    db.seed_demo_data().context("Failed to seed demo data")?;

    println!("✅ Demo data loaded.");
    println!("   Run 'centavo expenses' to see the seeded records.");

    Ok(())
}

pub async fn cmd_serve(
    db_path: &Path,
    host: &str,
    port: u16,
    no_auth: bool,
    no_encrypt: bool,
) -> Result<()> {
    println!("🚀 Starting Centavo web server...");
    println!("   Database: {}", db_path.display());
    println!("   Listening: http://{}:{}", host, port);

    let api_keys = centavo_server::ServerConfig::api_keys_from_env();

    if no_auth {
        println!();
        println!("   ⚠️  Authentication DISABLED - do not expose to network!");
    } else if api_keys.is_empty() {
        println!("   ❌ Authentication: no API keys set (CENTAVO_API_KEYS)");
        println!("      All requests will be rejected until keys are configured");
    } else {
        println!(
            "   🔑 API keys: {} configured (CENTAVO_API_KEYS)",
            api_keys.len()
        );
    }
    if no_encrypt {
        println!("   ⚠️  Encryption DISABLED (--no-encrypt)");
    }
    println!();
    println!("   Press Ctrl+C to stop");

    let db = open_db(db_path, no_encrypt)?;

    let config = centavo_server::ServerConfig {
        require_auth: !no_auth,
        allowed_origins: vec![],
        api_keys,
    };

    centavo_server::serve(db, host, port, config).await?;

    Ok(())
}

pub fn cmd_status(db_path: &Path, no_encrypt: bool) -> Result<()> {
    use centavo_core::db::DB_KEY_ENV;
    use std::fs;

    println!();
    println!("📊 Centavo Status");
    println!("   ─────────────────────────────────────────────────────────────");
    println!("   Database: {}", db_path.display());

    if db_path.exists() {
        if let Ok(metadata) = fs::metadata(db_path) {
            let size_kb = metadata.len() as f64 / 1024.0;
            if size_kb < 1024.0 {
                println!("   Size: {:.1} KB", size_kb);
            } else {
                println!("   Size: {:.1} MB", size_kb / 1024.0);
            }
        }
    } else {
        println!("   Size: (database not initialized)");
    }

    let has_key = std::env::var(DB_KEY_ENV).is_ok();
    if no_encrypt {
        println!("   ⚠️  Encryption: DISABLED (--no-encrypt)");
    } else if has_key {
        println!("   🔒 Encryption: ENABLED ({}=***)", DB_KEY_ENV);
    } else {
        println!("   ❌ Encryption: REQUIRED but {} not set", DB_KEY_ENV);
    }

    if db_path.exists() {
        match open_db(db_path, no_encrypt) {
            Ok(db) => {
                let accounts = db.list_accounts()?;
                let records = db.fetch_records()?;
                println!();
                println!("   Accounts: {}", accounts.len());
                println!("   Expenses: {}", records.len());
            }
            Err(e) => {
                println!();
                println!("   ❌ Error opening database: {}", e);
                if !no_encrypt && !has_key {
                    println!("      Set {} or use --no-encrypt", DB_KEY_ENV);
                } else if has_key {
                    println!("      (Check if {} is correct)", DB_KEY_ENV);
                }
            }
        }
    }

    println!();
    Ok(())
}

pub fn cmd_expenses(db: &Database, limit: usize) -> Result<()> {
    let records = load_normalized(db)?;

    if records.is_empty() {
        println!("No expenses found. Load demo data with:");
        println!("  centavo seed");
        return Ok(());
    }

    println!();
    println!("💰 Expenses");
    println!("   ─────────────────────────────────────────────────────────────");

    for record in records.iter().take(limit) {
        let account = record.account_name.as_deref().unwrap_or("-");
        let synced = if record.is_synced_from_bank {
            " 🏦"
        } else {
            ""
        };
        println!(
            "   {} R$ {:>10}  {:12} {} ({}){}",
            record.date, record.amount, record.category, record.description, account, synced
        );
    }

    if records.len() > limit {
        println!("   ... and {} more", records.len() - limit);
    }

    Ok(())
}

pub async fn cmd_insights(db: &Database) -> Result<()> {
    let records = load_normalized(db)?;

    let today = chrono::Utc::now().date_naive();
    let snapshot = compute_metrics(&records, today);
    let breakdown = build_breakdown(&records);

    let ai = AIClient::from_env();
    if let Some(ref client) = ai {
        println!("🤖 Model backend: {} at {}", client.model(), client.host());
    } else {
        println!("💡 Tip: Set OLLAMA_HOST (or AI_BACKEND=mock) for generated insights");
    }

    let insight = generate_insight(ai.as_ref(), &snapshot, &breakdown, records.len()).await;

    println!();
    println!("📊 Spending Metrics");
    println!("   ─────────────────────────────────────────────────────────────");
    println!("   Total: R$ {}", snapshot.total_amount);
    println!("   This month: R$ {}", snapshot.current_period_amount);
    println!("   Average per expense: R$ {}", snapshot.average_per_record);
    let trend_icon = match snapshot.trend {
        Trend::Increasing => "📈",
        Trend::Decreasing => "📉",
        Trend::Stable => "➡️",
    };
    println!("   Trend: {} {}", trend_icon, snapshot.trend);

    println!();
    println!("💬 {}", insight.summary);
    println!();
    for tip in &insight.tips {
        println!("   💡 {}", tip);
    }

    if !insight.category_breakdown.is_empty() {
        let mut sorted: Vec<_> = insight.category_breakdown.iter().collect();
        sorted.sort_by(|a, b| b.1.cmp(a.1));

        println!();
        println!("   By category:");
        for (category, amount) in sorted {
            println!("   {:12} R$ {}", category, amount);
        }
    }

    Ok(())
}

pub async fn cmd_categorize(description: &str) -> Result<()> {
    let Some(ai) = AIClient::from_env() else {
        println!("❌ No model backend configured.");
        println!("   Set OLLAMA_HOST to your Ollama endpoint, or AI_BACKEND=mock for testing.");
        return Ok(());
    };

    println!("🤖 Asking {} at {}...", ai.model(), ai.host());

    let suggestion = ai
        .suggest_category(description)
        .await
        .context("Model request failed")?;
    let category = categories::coerce(&suggestion.category);

    println!("   \"{}\" → {}", description, category);

    Ok(())
}

/// Fetch stored rows and normalize them, skipping rows that fail to decode.
fn load_normalized(db: &Database) -> Result<Vec<centavo_core::CanonicalRecord>> {
    let raw = db.fetch_records()?;
    Ok(raw
        .iter()
        .filter_map(|record| match normalize(record) {
            Ok(canonical) => Some(canonical),
            Err(e) => {
                tracing::warn!(id = ?record.id, error = %e, "Skipping malformed expense row");
                None
            }
        })
        .collect())
}

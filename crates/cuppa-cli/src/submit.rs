//! Crowd-sourced amenity and rating submissions.

use clap::{ArgAction, Subcommand};
use cuppa_core::Actor;
use uuid::Uuid;

/// Sub-commands available under `submit`. `shop` is the shop's UUID as shown
/// by `cuppa search`.
#[derive(Debug, Subcommand)]
pub enum SubmitCommands {
    /// Report whether a shop has Wi-Fi
    Wifi {
        shop: Uuid,
        #[arg(long, action = ArgAction::Set, default_value_t = true)]
        available: bool,
        /// Free-text note (network name, speed, password policy)
        #[arg(long)]
        detail: Option<String>,
    },
    /// Report whether a shop has charging outlets
    Charger {
        shop: Uuid,
        #[arg(long, action = ArgAction::Set, default_value_t = true)]
        available: bool,
        #[arg(long, value_parser = clap::value_parser!(i32).range(0..))]
        outlets: Option<i32>,
    },
    /// Report whether a shop welcomes pets
    Pets {
        shop: Uuid,
        #[arg(long, action = ArgAction::Set, default_value_t = true)]
        friendly: bool,
    },
    /// Rate a shop from 1 to 5
    Rating {
        shop: Uuid,
        #[arg(value_parser = clap::value_parser!(i16).range(1..=5))]
        score: i16,
        #[arg(long)]
        comment: Option<String>,
    },
}

/// Record one submission as the actor behind `token`.
///
/// # Errors
///
/// Returns an error if the shop does not exist or the write fails.
pub(crate) async fn run_submit(
    pool: &sqlx::PgPool,
    token: &str,
    command: SubmitCommands,
) -> anyhow::Result<()> {
    let actor = Actor::from_token(token.trim());
    let not_found = |shop: Uuid| anyhow::anyhow!("shop '{shop}' not found");

    let shop = match command {
        SubmitCommands::Wifi {
            shop,
            available,
            detail,
        } => {
            cuppa_db::upsert_wifi_detail(pool, shop, &actor, available, detail.as_deref())
                .await
                .map_err(|e| map_error(e, not_found(shop)))?;
            shop
        }
        SubmitCommands::Charger {
            shop,
            available,
            outlets,
        } => {
            cuppa_db::upsert_charger_detail(pool, shop, &actor, available, outlets)
                .await
                .map_err(|e| map_error(e, not_found(shop)))?;
            shop
        }
        SubmitCommands::Pets { shop, friendly } => {
            cuppa_db::set_pet_friendly(pool, shop, &actor, friendly)
                .await
                .map_err(|e| map_error(e, not_found(shop)))?;
            shop
        }
        SubmitCommands::Rating {
            shop,
            score,
            comment,
        } => {
            cuppa_db::upsert_rating(pool, shop, &actor, score, comment.as_deref())
                .await
                .map_err(|e| map_error(e, not_found(shop)))?;
            shop
        }
    };

    println!("recorded submission for {shop} as {}", actor.id);
    Ok(())
}

fn map_error(error: cuppa_db::DbError, not_found: anyhow::Error) -> anyhow::Error {
    match error {
        cuppa_db::DbError::NotFound => not_found,
        other => other.into(),
    }
}

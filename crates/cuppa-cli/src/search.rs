//! `cuppa search`: run the pipeline and print the results.

use cuppa_core::{haversine_km, Actor, AppConfig, Coordinates, FavoritesStore, Shop};
use cuppa_search::{SearchContext, SearchOutcome, SearchPipeline};

/// Run one search and print it as a table (or JSON with `json`).
///
/// # Errors
///
/// Returns an error if an API key is missing, the coordinates are out of
/// range, or the model or places call fails. The error text is the
/// user-facing message.
pub(crate) async fn run_search(
    config: &AppConfig,
    pool: sqlx::PgPool,
    prompt: &str,
    position: Option<(f64, f64)>,
    actor_token: Option<&str>,
    json: bool,
) -> anyhow::Result<()> {
    let anchor = match position {
        Some((lat, lng)) => Some(
            Coordinates::new(lat, lng)
                .ok_or_else(|| anyhow::anyhow!("coordinates {lat},{lng} are out of range"))?,
        ),
        None => None,
    };
    let actor = actor_token
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(Actor::from_token);

    let pipeline = SearchPipeline::from_config(config, pool)
        .map_err(|e| anyhow::anyhow!(e.user_message()))?;
    let context = SearchContext::new(anchor, actor);
    let outcome = pipeline.run(prompt, &context).await.map_err(|e| {
        tracing::debug!(error = %e, "search failed");
        anyhow::anyhow!(e.user_message())
    })?;

    if json {
        println!("{}", serde_json::to_string_pretty(&outcome)?);
        return Ok(());
    }

    let favorites = match FavoritesStore::open(&config.favorites_path) {
        Ok(store) => Some(store),
        Err(e) => {
            tracing::warn!(error = %e, "could not read favorites; continuing without them");
            None
        }
    };
    let origin = anchor.unwrap_or(config.default_location);
    print!("{}", render_outcome(&outcome, origin, favorites.as_ref()));
    Ok(())
}

fn render_outcome(
    outcome: &SearchOutcome,
    origin: Coordinates,
    favorites: Option<&FavoritesStore>,
) -> String {
    match outcome {
        SearchOutcome::Unrelated { message } | SearchOutcome::NeedsClarification { message } => {
            format!("{message}\n")
        }
        SearchOutcome::Results {
            keywords,
            shops,
            notice,
            ..
        } => {
            let mut out = format!("searched for \"{keywords}\"\n");
            if let Some(notice) = notice {
                out.push_str(&notice.message());
                out.push('\n');
            }
            if shops.is_empty() {
                return out;
            }

            out.push_str(&format!(
                "{:<2}{:<32}{:<8}{:<7}{:<9}{:<8}ID\n",
                "", "NAME", "RATING", "PRICE", "DIST", "WIFI"
            ));
            for shop in shops {
                let favorite = favorites.is_some_and(|f| f.contains(&shop.external_id));
                out.push_str(&render_row(shop, origin, favorite));
                out.push('\n');
            }
            out
        }
    }
}

fn render_row(shop: &Shop, origin: Coordinates, favorite: bool) -> String {
    let rating = shop
        .rating
        .map_or_else(|| "-".to_string(), |r| format!("{r:.1}"));
    let price = shop
        .price_level
        .map_or_else(|| "-".to_string(), |p| "$".repeat(usize::from(p.max(1))));
    let distance = shop.location.map_or_else(
        || "-".to_string(),
        |l| format!("{:.1}km", haversine_km(origin, l)),
    );
    let wifi = match shop.amenities.wifi {
        Some(true) => "yes",
        Some(false) => "no",
        None => "?",
    };
    let id = shop
        .id
        .map_or_else(|| shop.external_id.clone(), |id| id.to_string());

    format!(
        "{:<2}{:<32}{:<8}{:<7}{:<9}{:<8}{}",
        if favorite { "*" } else { "" },
        truncate(&shop.name, 30),
        rating,
        price,
        distance,
        wifi,
        id
    )
}

fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let mut cut: String = text.chars().take(max_chars.saturating_sub(1)).collect();
    cut.push('…');
    cut
}

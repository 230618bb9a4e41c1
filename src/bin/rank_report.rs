use std::collections::BTreeSet;

use anyhow::{bail, Context, Result};

use xg_terminal::bar;
use xg_terminal::config::{self, arg_value, Config};
use xg_terminal::dataset::Dataset;
use xg_terminal::metrics::resolve;
use xg_terminal::scene::format_value;
use xg_terminal::view_state::ViewState;

fn main() -> Result<()> {
    config::load_dotenv();
    let args = std::env::args().skip(1).collect::<Vec<_>>();
    let mut config = Config::from_env();
    config.apply_args(&args);

    let dataset = Dataset::load(&config.sources).context("load dataset")?;
    let view = ViewState::initial(
        &dataset,
        config.default_season.as_deref(),
        config.default_mode,
    );
    if view.season().is_empty() {
        bail!("dataset has no seasons");
    }
    if let Some(requested) = config.default_season.as_deref() {
        if requested != view.season() {
            bail!(
                "unknown season {requested}; available: {}",
                dataset.seasons().join(", ")
            );
        }
    }

    let squads_in_season = dataset.squads_in(view.season());
    let selection: BTreeSet<String> = arg_value(&args, "squads")
        .map(|raw| {
            raw.split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect()
        })
        .unwrap_or_default();
    for squad in &selection {
        if !squads_in_season.contains(squad.as_str()) {
            bail!("squad {squad} did not play in {}", view.season());
        }
    }

    let pair = resolve(view.mode());
    let ranked = bar::rank(&dataset, view.season(), pair, &selection, config.limits);

    println!("Season: {}", view.season());
    println!("Mode: {}", view.mode().label());
    println!(
        "Filter: {}",
        if selection.is_empty() {
            "all teams".to_string()
        } else {
            selection.iter().cloned().collect::<Vec<_>>().join(", ")
        }
    );
    println!(
        "Players over {} minutes, top {} by {}",
        format_value(config.limits.min_minutes),
        config.limits.rank_limit,
        pair.bar.label()
    );
    if ranked.is_empty() {
        println!("(no players)");
        return Ok(());
    }
    for (idx, player) in ranked.iter().enumerate() {
        println!(
            "{:>2}. {:<28} {:<20} {:>6} {:>6}  xG/90 {}",
            idx + 1,
            player.player,
            player.team,
            format_value(player.minutes),
            format_value(player.value(pair.bar).unwrap_or(0.0)),
            format_value(player.xg_per90)
        );
    }

    Ok(())
}

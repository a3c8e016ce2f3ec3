use chrono::{DateTime, Duration, Local, NaiveDate, NaiveDateTime, TimeZone, Utc};
use clap::{Parser, Subcommand};
use dram_core::aggregation::DayWindow;
use dram_core::finance::{
    alcohol_calories, budget_status, health_savings_estimate, weight_impact,
};
use dram_core::*;
use std::path::{Path, PathBuf};
use uuid::Uuid;

#[derive(Parser)]
#[command(name = "dram")]
#[command(about = "Personal drink log with BAC and spending analytics", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Override data directory
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Record a drink
    Add {
        /// beer, wine, spirits, rice-wine, cocktail, highball, chu-hi, other
        #[arg(long)]
        category: DrinkCategory,

        /// Volume in ml (category default if omitted)
        #[arg(long)]
        volume: Option<f64>,

        /// Alcohol by volume in percent (category default if omitted)
        #[arg(long)]
        abv: Option<f64>,

        #[arg(long)]
        price: Option<f64>,

        #[arg(long)]
        location: Option<String>,

        #[arg(long)]
        note: Option<String>,

        /// When the drink happened (RFC 3339 or "YYYY-MM-DD HH:MM" local)
        #[arg(long, value_parser = parse_when)]
        at: Option<DateTime<Utc>>,

        #[arg(long)]
        favorite: bool,
    },

    /// Record a drink from a preset (id or name)
    Quick {
        preset: String,

        #[arg(long, value_parser = parse_when)]
        at: Option<DateTime<Utc>>,

        #[arg(long)]
        price: Option<f64>,
    },

    /// Change fields of a recorded drink
    Edit {
        id: Uuid,

        #[arg(long)]
        category: Option<DrinkCategory>,

        #[arg(long)]
        volume: Option<f64>,

        #[arg(long)]
        abv: Option<f64>,

        #[arg(long)]
        price: Option<f64>,

        #[arg(long)]
        location: Option<String>,

        #[arg(long)]
        note: Option<String>,

        #[arg(long, value_parser = parse_when)]
        at: Option<DateTime<Utc>>,

        #[arg(long)]
        favorite: Option<bool>,
    },

    /// Delete a recorded drink
    Delete { id: Uuid },

    /// List recent drinks
    List {
        #[arg(long, default_value_t = 7, value_parser = days_parser())]
        days: i64,

        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// List presets
    Presets,

    /// Mark a drink as favourite and save it as a preset
    Favorite { id: Uuid, name: String },

    /// Show BAC, sobering time and today's totals (default)
    Status {
        #[arg(long)]
        json: bool,
    },

    /// Show the 7 days ending at a date
    Week {
        #[arg(long)]
        date: Option<NaiveDate>,
    },

    /// Show every day of a month
    Month {
        #[arg(long)]
        date: Option<NaiveDate>,
    },

    /// Show each category's share over recent days
    Breakdown {
        #[arg(long, default_value_t = 30, value_parser = days_parser())]
        days: i64,
    },

    /// Project savings from cutting down
    Savings {
        /// Target reduction in percent (config default if omitted)
        #[arg(long)]
        reduction: Option<f64>,
    },

    /// Show or update the physiology profile
    Profile {
        #[arg(long)]
        sex: Option<BiologicalSex>,

        #[arg(long)]
        weight: Option<f64>,

        #[arg(long)]
        goal: Option<DrinkingGoal>,

        #[arg(long)]
        height: Option<f64>,

        #[arg(long)]
        birth_date: Option<NaiveDate>,
    },

    /// Export all drinks to CSV
    Export { path: PathBuf },

    /// Import drinks from CSV, skipping known ids
    Import { path: PathBuf },

    /// Rewrite the journal with only live events
    Compact,
}

fn main() -> Result<()> {
    // Logs go to stderr; keep them quiet unless RUST_LOG asks
    dram_core::logging::init_with_level("warn");

    let cli = Cli::parse();

    let config = Config::load()?;
    let data_dir = cli
        .data_dir
        .unwrap_or_else(|| config.data.data_dir.clone());

    tracing::debug!("Using data dir {:?}", data_dir);
    let mut store = FileStore::open(&data_dir)?;

    match cli.command.unwrap_or(Commands::Status { json: false }) {
        Commands::Add {
            category,
            volume,
            abv,
            price,
            location,
            note,
            at,
            favorite,
        } => {
            let volume = volume.unwrap_or_else(|| category.defaults().volume_ml);
            let mut event =
                ConsumptionEvent::new(category, volume, abv, at.unwrap_or_else(Utc::now));
            event.price = price;
            event.location = location;
            event.note = note;
            event.is_favorite = favorite;
            cmd_record(&mut store, event)
        }
        Commands::Quick { preset, at, price } => {
            let preset = catalog::find_preset(store.presets(), &preset)?.clone();
            let mut event = ConsumptionEvent::from_preset(&preset, at.unwrap_or_else(Utc::now));
            if price.is_some() {
                event.price = price;
            }
            cmd_record(&mut store, event)
        }
        Commands::Edit {
            id,
            category,
            volume,
            abv,
            price,
            location,
            note,
            at,
            favorite,
        } => {
            let mut event = store
                .event(id)
                .cloned()
                .ok_or_else(|| Error::NotFound(format!("event {}", id)))?;
            if let Some(category) = category {
                event.category = category;
            }
            if let Some(volume) = volume {
                event.volume_ml = volume;
            }
            if let Some(abv) = abv {
                event.abv_percent = abv;
            }
            if price.is_some() {
                event.price = price;
            }
            if location.is_some() {
                event.location = location;
            }
            if note.is_some() {
                event.note = note;
            }
            if let Some(at) = at {
                event.timestamp = at;
            }
            if let Some(favorite) = favorite {
                event.is_favorite = favorite;
            }
            store.upsert_event(event.clone())?;
            println!("✓ Updated {}", event.id);
            print_event_line(&event, &config);
            Ok(())
        }
        Commands::Delete { id } => {
            store.delete_event(id)?;
            println!("✓ Deleted {}", id);
            Ok(())
        }
        Commands::List { days, json } => cmd_list(&store, days, json, &config),
        Commands::Presets => cmd_presets(&store),
        Commands::Favorite { id, name } => cmd_favorite(&mut store, id, name),
        Commands::Status { json } => cmd_status(&store, json, &config),
        Commands::Week { date } => cmd_week(&store, date.unwrap_or_else(today), &config),
        Commands::Month { date } => cmd_month(&store, date.unwrap_or_else(today), &config),
        Commands::Breakdown { days } => cmd_breakdown(&store, days, &config),
        Commands::Savings { reduction } => cmd_savings(
            &store,
            reduction.unwrap_or(config.finance.target_reduction_percent),
            &config,
        ),
        Commands::Profile {
            sex,
            weight,
            goal,
            height,
            birth_date,
        } => cmd_profile(&mut store, sex, weight, goal, height, birth_date),
        Commands::Export { path } => cmd_export(&store, &path),
        Commands::Import { path } => cmd_import(&mut store, &path),
        Commands::Compact => {
            let count = store.compact()?;
            println!("✓ Compacted journal to {} events", count);
            println!("  Journal: {}", store.journal_path().display());
            Ok(())
        }
    }
}

/// Look-back windows are limited to 100 years
fn days_parser() -> clap::builder::RangedI64ValueParser<i64> {
    clap::value_parser!(i64).range(1..=MAX_LOOKBACK_DAYS)
}

const MAX_LOOKBACK_DAYS: i64 = 36_500;

fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// Accept RFC 3339, or a local "YYYY-MM-DD HH:MM" / "YYYY-MM-DDTHH:MM"
fn parse_when(s: &str) -> std::result::Result<DateTime<Utc>, String> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Utc));
    }
    for format in ["%Y-%m-%d %H:%M", "%Y-%m-%dT%H:%M"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, format) {
            return Local
                .from_local_datetime(&naive)
                .earliest()
                .map(|dt| dt.with_timezone(&Utc))
                .ok_or_else(|| format!("{} does not exist in the local time zone", s));
        }
    }
    Err(format!("Invalid time '{}': use RFC 3339 or YYYY-MM-DD HH:MM", s))
}

fn money(amount: f64, config: &Config) -> String {
    format!("{:.0} {}", amount, config.finance.currency)
}

fn cmd_record(store: &mut FileStore, event: ConsumptionEvent) -> Result<()> {
    store.upsert_event(event.clone())?;
    println!(
        "✓ Logged {} ({:.0} ml @ {:.1}%, {:.1} g alcohol)",
        event.category,
        event.volume_ml,
        event.abv_percent,
        event.alcohol_grams()
    );
    println!("  id: {}", event.id);
    Ok(())
}

fn print_event_line(event: &ConsumptionEvent, config: &Config) {
    let local = event.timestamp.with_timezone(&Local);
    let price = event
        .price
        .map(|p| money(p, config))
        .unwrap_or_else(|| "-".into());
    println!(
        "  {}  {}  {:<10} {:>6.0} ml {:>5.1}% {:>6.1} g  {}{}",
        event.id,
        local.format("%Y-%m-%d %H:%M"),
        event.category.label(),
        event.volume_ml,
        event.abv_percent,
        event.alcohol_grams(),
        price,
        if event.is_favorite { "  ★" } else { "" }
    );
}

fn cmd_list(store: &FileStore, days: i64, json: bool, config: &Config) -> Result<()> {
    let end = today();
    let start = end - Duration::days(days - 1);
    let aggregator = Aggregator::new(store.events(), Local);

    let mut events = aggregator.events_between(start, end);
    events.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));

    if json {
        println!("{}", serde_json::to_string_pretty(&events)?);
        return Ok(());
    }

    if events.is_empty() {
        println!("No drinks recorded between {} and {}.", start, end);
        return Ok(());
    }

    for event in &events {
        print_event_line(event, config);
    }
    Ok(())
}

fn cmd_presets(store: &FileStore) -> Result<()> {
    for preset in store.presets() {
        println!(
            "  {:<24} {:<18} {:<10} {:>5.0} ml {:>5.1}%{}",
            preset.id,
            preset.name,
            preset.category.label(),
            preset.volume_ml,
            preset.abv_percent,
            if preset.is_default { "" } else { "  (custom)" }
        );
    }
    Ok(())
}

fn cmd_favorite(store: &mut FileStore, id: Uuid, name: String) -> Result<()> {
    let mut event = store
        .event(id)
        .cloned()
        .ok_or_else(|| Error::NotFound(format!("event {}", id)))?;
    event.is_favorite = true;
    let preset = ConsumptionPreset::from_event(name, &event);
    store.upsert_event(event)?;
    let (name, id) = (preset.name.clone(), preset.id.clone());
    store.upsert_preset(preset)?;
    println!("✓ Saved preset '{}' ({})", name, id);
    Ok(())
}

fn cmd_status(store: &FileStore, json: bool, config: &Config) -> Result<()> {
    let now = Utc::now();
    let status = ConsumptionStatus::compute(store.events(), store.profile(), now, Local);

    if json {
        println!("{}", serde_json::to_string_pretty(&status)?);
        return Ok(());
    }

    let aggregator = Aggregator::new(store.events(), Local);
    let streak = aggregator.alcohol_free_streak(today());

    println!("\n╭─────────────────────────────────────────╮");
    println!("│  STATUS  {}", now.with_timezone(&Local).format("%Y-%m-%d %H:%M"));
    println!("╰─────────────────────────────────────────╯");
    println!();
    println!(
        "  BAC (est.):     {:.4}%  ({})",
        status.current_bac,
        status.intoxication.label()
    );
    println!(
        "  Remaining:      {:.1} g, sober in ~{:.1} h",
        status.remaining_grams, status.sobering_hours
    );
    if status.safe_to_drive() {
        println!("  Driving:        below {:.2}%", pharmacokinetics::LEGAL_DRIVING_BAC);
    } else {
        println!(
            "  Driving:        wait at least {:.1} h",
            status.driving_delay_hours
        );
    }
    println!(
        "  Today:          {} drinks, {:.1} g, {} ({:.0}% of {:.1} g limit)",
        status.today.count,
        status.today.alcohol_grams,
        money(status.today.spend, config),
        status.limit_used_percent,
        status.daily_limit_grams
    );
    println!(
        "  Last 7 days:    {:.1} g, risk {}",
        status.week_grams,
        status.health_risk.label()
    );
    println!("  Alcohol-free:   {} day streak", streak);
    println!();
    Ok(())
}

fn print_day_buckets(buckets: &[DailyBucket], config: &Config) {
    let today = today();
    let max_grams = buckets
        .iter()
        .map(|b| b.total.alcohol_grams)
        .fold(0.0_f64, f64::max);

    for bucket in buckets {
        let bar_len = if max_grams > 0.0 {
            (bucket.total.alcohol_grams / max_grams * 30.0).round() as usize
        } else {
            0
        };
        let marker = if bucket.date > today {
            "·"
        } else if bucket.alcohol_free {
            "○"
        } else {
            "●"
        };
        println!(
            "  {} {} {:>6.1} g {:>3} {:>10}  {}",
            bucket.date.format("%a %m-%d"),
            marker,
            bucket.total.alcohol_grams,
            bucket.total.count,
            money(bucket.total.spend, config),
            "█".repeat(bar_len)
        );
    }
}

fn print_window_summary(
    store: &FileStore,
    start: NaiveDate,
    end: NaiveDate,
    free_days: usize,
    config: &Config,
) {
    let aggregator = Aggregator::new(store.events(), Local);
    let total = aggregator.range_total(start, end);
    let window_events = aggregator.events_between(start, end);

    println!();
    println!(
        "  Total: {:.1} g in {} drinks, {}",
        total.alcohol_grams,
        total.count,
        money(total.spend, config)
    );
    println!("  Alcohol-free days: {}", free_days);
    match most_frequent_category(window_events) {
        Some(category) => println!("  Most frequent: {}", category),
        None => println!("  Most frequent: -"),
    }
}

fn cmd_week(store: &FileStore, ending: NaiveDate, config: &Config) -> Result<()> {
    let aggregator = Aggregator::new(store.events(), Local);
    let buckets = aggregator.week_window(ending);
    let free_days = aggregator.alcohol_free_day_count(DayWindow::Week { ending });

    println!("\n  Week ending {}\n", ending);
    print_day_buckets(&buckets, config);
    if let (Some(first), Some(last)) = (buckets.first(), buckets.last()) {
        print_window_summary(store, first.date, last.date, free_days, config);
        let week_grams: f64 = buckets.iter().map(|b| b.total.alcohol_grams).sum();
        println!(
            "  Health risk: {}",
            pharmacokinetics::health_risk(week_grams).label()
        );
    }
    println!();
    Ok(())
}

fn cmd_month(store: &FileStore, containing: NaiveDate, config: &Config) -> Result<()> {
    let aggregator = Aggregator::new(store.events(), Local);
    let buckets = aggregator.month_window(containing);
    let free_days = aggregator.alcohol_free_day_count(DayWindow::Month {
        containing,
        through: today(),
    });

    println!("\n  {}\n", containing.format("%B %Y"));
    print_day_buckets(&buckets, config);
    if let (Some(first), Some(last)) = (buckets.first(), buckets.last()) {
        print_window_summary(store, first.date, last.date, free_days, config);
    }
    println!();
    Ok(())
}

fn cmd_breakdown(store: &FileStore, days: i64, config: &Config) -> Result<()> {
    let end = today();
    let start = end - Duration::days(days - 1);
    let aggregator = Aggregator::new(store.events(), Local);
    let window = aggregator.events_between(start, end);
    let breakdown = category_breakdown(window.iter().copied());

    println!("\n  Categories {} .. {}\n", start, end);
    if breakdown.is_empty() {
        println!("  No drinks recorded.");
        println!();
        return Ok(());
    }

    for row in &breakdown {
        println!(
            "  {:<10} {:>3} drinks {:>7.1} g {:>5.1}%  {:>10} {:>5.1}%",
            row.category.label(),
            row.count,
            row.alcohol_grams,
            row.share_percent,
            money(row.spend, config),
            row.spend_share_percent
        );
    }

    let window_owned: Vec<ConsumptionEvent> = window.into_iter().cloned().collect();
    let peak = Aggregator::new(&window_owned, Local)
        .hourly_distribution()
        .into_iter()
        .filter(|h| h.count > 0)
        .max_by_key(|h| h.count);
    if let Some(hour) = peak {
        println!("\n  Busiest hour: {:02}:00 ({} drinks)", hour.hour, hour.count);
    }
    println!();
    Ok(())
}

fn cmd_savings(store: &FileStore, reduction: f64, config: &Config) -> Result<()> {
    let events = store.events();
    let projection = projected_savings(events, reduction);

    let aggregator = Aggregator::new(events, Local);
    let week = aggregator.week_window(today());
    let week_grams: f64 = week.iter().map(|b| b.total.alcohol_grams).sum();
    let reduced_grams_per_week = week_grams * reduction.max(0.0) / 100.0;
    let reduced_kcal_per_day = alcohol_calories(reduced_grams_per_week / 7.0);

    println!("\n  Cutting down by {:.0}%\n", reduction);
    println!("  Weekly savings:   {}", money(projection.weekly, config));
    println!("  Monthly savings:  {}", money(projection.monthly, config));
    println!("  Yearly savings:   {}", money(projection.yearly, config));
    println!(
        "  Health value:     {} per day",
        money(health_savings_estimate(reduced_grams_per_week), config)
    );
    println!(
        "  Weight impact:    {:.2} kg over 30 days",
        weight_impact(reduced_kcal_per_day, 30.0)
    );

    if let Some(budget) = config.finance.weekly_budget {
        let week_events = aggregator.events_between(today() - Duration::days(6), today());
        let status = budget_status(budget, week_events);
        println!(
            "  Budget (7 days):  spent {} of {}, {} left",
            money(status.spent, config),
            money(status.budget, config),
            money(status.remaining, config)
        );
    }
    println!();
    Ok(())
}

fn cmd_profile(
    store: &mut FileStore,
    sex: Option<BiologicalSex>,
    weight: Option<f64>,
    goal: Option<DrinkingGoal>,
    height: Option<f64>,
    birth_date: Option<NaiveDate>,
) -> Result<()> {
    let mut profile = store.profile().clone();
    let changed = sex.is_some()
        || weight.is_some()
        || goal.is_some()
        || height.is_some()
        || birth_date.is_some();

    if let Some(sex) = sex {
        profile.biological_sex = sex;
    }
    if let Some(weight) = weight {
        profile.body_weight_kg = weight;
    }
    if let Some(goal) = goal {
        profile.goal = goal;
    }
    if height.is_some() {
        profile.height_cm = height;
    }
    if birth_date.is_some() {
        profile.birth_date = birth_date;
    }

    if changed {
        store.set_profile(profile.clone())?;
        println!("✓ Profile updated");
    }

    println!("  Sex:          {:?}", profile.biological_sex);
    println!("  Weight:       {:.1} kg", profile.body_weight_kg);
    println!("  Goal:         {:?}", profile.goal);
    println!("  Daily limit:  {:.1} g", profile.daily_limit_grams());
    if let Some(age) = profile.age_on(today()) {
        println!("  Age:          {}", age);
    }
    if let Some(bmi) = profile.bmi() {
        println!("  BMI:          {:.1}", bmi);
    }
    Ok(())
}

fn cmd_export(store: &FileStore, path: &Path) -> Result<()> {
    let count = export::write_csv(store.events(), path)?;
    println!("✓ Exported {} drinks to {}", count, path.display());
    Ok(())
}

fn cmd_import(store: &mut FileStore, path: &Path) -> Result<()> {
    let events = export::read_csv(path)?;
    let read = events.len();
    let added = store.import(events)?;
    println!("✓ Imported {} of {} drinks", added, read);
    Ok(())
}

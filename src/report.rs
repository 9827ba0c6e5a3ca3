use bookstack_monitor_coordinator::{
    CachedResult,
    ConnectivityState,
};
use chrono::SecondsFormat;
use comfy_table::{
    presets,
    Attribute,
    Cell,
    Color,
    ContentArrangement,
    Table,
};
use eyre::Result;

pub fn json(cached: &CachedResult) -> Result<String> {
    Ok(serde_json::to_string_pretty(cached)?)
}

/// Human readable report of the cached state, one table per section.
pub fn render(cached: &CachedResult) -> String {
    let mut sections = vec![status_table(cached).to_string()];
    let Some(snapshot) = cached.snapshot.as_deref() else {
        sections.push("No data yet.".to_string());
        return sections.join("\n");
    };

    let mut counts = new_table("CONTENT");
    for (endpoint, count) in snapshot.counts.iter() {
        counts.add_row(vec![
            Cell::new(format!("{endpoint:?}")).add_attribute(Attribute::Bold),
            Cell::new(count),
        ]);
    }
    sections.push(counts.to_string());

    if let Some(page) = &snapshot.last_updated_page {
        let mut table = new_table("LAST UPDATED PAGE");
        table.add_row(vec![Cell::new("Name").add_attribute(Attribute::Bold), Cell::new(&page.name)]);
        table.add_row(vec![
            Cell::new("Updated").add_attribute(Attribute::Bold),
            Cell::new(page.updated_at.to_rfc3339_opts(SecondsFormat::Secs, true)),
        ]);
        table.add_row(vec![
            Cell::new("By").add_attribute(Attribute::Bold),
            Cell::new(page.updated_by_name.as_deref().unwrap_or("-")),
        ]);
        table.add_row(vec![Cell::new("URL").add_attribute(Attribute::Bold), Cell::new(&page.url)]);
        sections.push(table.to_string());
    }

    if !snapshot.shelves.is_empty() {
        let mut table = Table::new();
        table
            .load_preset(presets::UTF8_FULL)
            .set_content_arrangement(ContentArrangement::Dynamic)
            .set_header(vec!["Shelf", "Books", "Chapters", "Pages", ""]);
        for shelf in &snapshot.shelves {
            table.add_row(vec![
                Cell::new(&shelf.name).add_attribute(Attribute::Bold),
                Cell::new(shelf.book_count),
                Cell::new(shelf.chapter_count),
                Cell::new(shelf.page_count),
                if shelf.partial {
                    Cell::new("partial").fg(Color::Yellow)
                } else {
                    Cell::new("")
                },
            ]);
        }
        sections.push(table.to_string());
    }

    sections.join("\n")
}

fn status_table(cached: &CachedResult) -> Table {
    let mut table = new_table("BOOKSTACK");
    let color = match cached.connectivity {
        ConnectivityState::Up => Color::Green,
        ConnectivityState::Degraded => Color::Yellow,
        ConnectivityState::Down => Color::Red,
    };
    table.add_row(vec![
        Cell::new("Connectivity").add_attribute(Attribute::Bold),
        Cell::new(cached.connectivity).fg(color),
    ]);
    if let Some(version) = cached.snapshot.as_ref().and_then(|snapshot| snapshot.system.version.as_deref()) {
        table.add_row(vec![Cell::new("Version").add_attribute(Attribute::Bold), Cell::new(version)]);
    }
    if let Some(updated_at) = cached.updated_at {
        table.add_row(vec![
            Cell::new("Updated").add_attribute(Attribute::Bold),
            Cell::new(updated_at.to_rfc3339_opts(SecondsFormat::Secs, true)),
        ]);
    }
    if cached.is_stale {
        table.add_row(vec![
            Cell::new("Stale").add_attribute(Attribute::Bold),
            Cell::new("yes").fg(Color::Yellow),
        ]);
    }
    if let Some(failure) = &cached.last_failure {
        table.add_row(vec![
            Cell::new("Last failure").add_attribute(Attribute::Bold),
            Cell::new(failure).fg(Color::Red),
        ]);
    }
    table
}

fn new_table(title: &str) -> Table {
    let mut table = Table::new();
    table
        .load_preset(presets::UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec![Cell::new(title).add_attribute(Attribute::Bold).fg(Color::Cyan)]);
    table
}

#[cfg(test)]
mod tests {
    use super::*;
    use bookstack_client::models::SystemInfo;
    use bookstack_monitor_coordinator::{
        Counts,
        CycleFailure,
        ShelfStat,
        Snapshot,
        StateCache,
    };
    use chrono::Utc;

    fn snapshot() -> Snapshot {
        Snapshot {
            counts: Counts {
                shelves: 2,
                books: 5,
                pages: 42,
                ..Counts::default()
            },
            shelves: vec![
                ShelfStat {
                    id: 1,
                    name: "Engineering".into(),
                    book_count: 3,
                    chapter_count: 4,
                    page_count: 30,
                    partial: false,
                },
                ShelfStat {
                    id: 2,
                    name: "Operations".into(),
                    book_count: 2,
                    chapter_count: 0,
                    page_count: 0,
                    partial: true,
                },
            ],
            last_updated_page: None,
            system: SystemInfo {
                version: Some("v24.05".into()),
                ..SystemInfo::default()
            },
            fetched_at: Utc::now(),
            degraded: true,
        }
    }

    #[test]
    fn empty_cache_report() {
        let report = render(&StateCache::new().read());
        assert!(report.contains("down"));
        assert!(report.contains("No data yet."));
    }

    #[test]
    fn report_lists_counts_and_shelves() {
        let cache = StateCache::new();
        cache.publish(snapshot(), ConnectivityState::Degraded);

        let report = render(&cache.read());
        assert!(report.contains("degraded"));
        assert!(report.contains("v24.05"));
        assert!(report.contains("Pages"));
        assert!(report.contains("42"));
        assert!(report.contains("Engineering"));
        assert!(report.contains("partial"));
        assert!(!report.contains("Stale"));
    }

    #[test]
    fn stale_report_keeps_previous_data() {
        let cache = StateCache::new();
        cache.publish(snapshot(), ConnectivityState::Up);
        cache.mark_stale(CycleFailure::Auth);

        let report = render(&cache.read());
        assert!(report.contains("Stale"));
        assert!(report.contains("authentication failed"));
        assert!(report.contains("Engineering"));
    }

    #[test]
    fn json_report() {
        let cache = StateCache::new();
        cache.publish(snapshot(), ConnectivityState::Up);

        let value: serde_json::Value = serde_json::from_str(&json(&cache.read()).unwrap()).unwrap();
        assert_eq!(value["connectivity"], "up");
        assert_eq!(value["snapshot"]["counts"]["books"], 5);
        assert_eq!(value["snapshot"]["shelves"][1]["partial"], true);
    }
}

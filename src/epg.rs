//! XMLTV guide rendering.
//!
//! Pure formatting over a persisted schedule: show blocks become
//! `<programme>` entries, ad breaks are omitted (they carry no clock
//! bounds). Fragment mode lets multiple channels combine under one
//! `<tv>` element.

use crate::schedule::Schedule;
use chrono::{Days, NaiveDate, NaiveDateTime, NaiveTime};

/// Format a timestamp the XMLTV way: `YYYYMMDDHHmmss +0000`.
fn format_xmltv_time(dt: NaiveDateTime) -> String {
    dt.format("%Y%m%d%H%M%S +0000").to_string()
}

/// A block bound as a datetime; minute 1440 is midnight of the next day.
fn bound_to_datetime(date: NaiveDate, minutes: u32) -> NaiveDateTime {
    let date = if minutes >= 1440 {
        date.checked_add_days(Days::new(1)).unwrap_or(date)
    } else {
        date
    };
    let minutes = minutes % 1440;
    let time = NaiveTime::from_hms_opt(minutes / 60, minutes % 60, 0).unwrap_or(NaiveTime::MIN);
    date.and_time(time)
}

/// Escape the five XML special characters.
pub fn xml_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

/// Render one channel's guide. With `fragment` set, the XML declaration
/// and `<tv>` wrapper are omitted so fragments can be concatenated.
pub fn render_xmltv(schedule: &Schedule, channel_name: &str, fragment: bool) -> String {
    let channel_xml_id = schedule.channel_id.replace(' ', "_");
    let mut lines = Vec::new();

    if !fragment {
        lines.push(r#"<?xml version="1.0" encoding="UTF-8"?>"#.to_string());
        lines.push("<tv>".to_string());
    }
    lines.push(format!("  <channel id=\"{channel_xml_id}\">"));
    lines.push(format!(
        "    <display-name>{}</display-name>",
        xml_escape(channel_name)
    ));
    lines.push("  </channel>".to_string());

    for show in schedule.blocks.iter().filter_map(|b| b.as_show()) {
        let start = bound_to_datetime(schedule.date, show.start_min);
        let stop = bound_to_datetime(schedule.date, show.end_min);
        lines.push(format!(
            "  <programme start=\"{}\" stop=\"{}\" channel=\"{}\">",
            format_xmltv_time(start),
            format_xmltv_time(stop),
            channel_xml_id
        ));
        lines.push(format!("    <title>{}</title>", xml_escape(&show.title)));
        if !show.category.is_empty() {
            lines.push(format!(
                "    <category>{}</category>",
                xml_escape(&show.category)
            ));
        }
        lines.push("  </programme>".to_string());
    }

    if !fragment {
        lines.push("</tv>".to_string());
    }
    lines.join("\n")
}

/// Combine per-channel fragments into one complete XMLTV document.
pub fn render_combined<'a>(
    schedules: impl IntoIterator<Item = (&'a Schedule, &'a str)>,
) -> String {
    let mut parts = vec![
        r#"<?xml version="1.0" encoding="UTF-8"?>"#.to_string(),
        "<tv>".to_string(),
    ];
    for (schedule, name) in schedules {
        parts.push(render_xmltv(schedule, name, true));
    }
    parts.push("</tv>".to_string());
    parts.join("\n")
}

//! M3U channel list for live-TV tuners.

use crate::config::ChannelConfig;

/// Render the tuner channel list. `base_url` is where the HLS manifests
/// are served from (e.g. `http://host:8001`).
pub fn render_m3u(channels: &[ChannelConfig], base_url: &str) -> String {
    let base = base_url.trim_end_matches('/');
    let mut lines = vec!["#EXTM3U".to_string()];
    for ch in channels {
        lines.push(format!(
            "#EXTINF:-1 tvg-id=\"{}\" tvg-name=\"{}\",{}",
            ch.id, ch.name, ch.name
        ));
        lines.push(format!("{}/{}/channel.m3u8", base, ch.id));
    }
    lines.join("\n") + "\n"
}

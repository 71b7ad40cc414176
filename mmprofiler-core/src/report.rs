use crate::profile::Profile;
use mmprofiler_common::Result;
use serde::Serialize;
use std::path::Path;

const STYLE: &str = "    body { font-family: Arial, sans-serif; margin: 30px; }
    h1 { color: #222; }
    .card { border: 1px solid #ddd; padding: 16px; margin-bottom: 18px; border-radius: 8px; }
    pre { background: #f7f7f7; padding: 10px; overflow: auto; }";

/// Render the six report sections as an HTML document.
pub fn render_html(profile: &Profile) -> Result<String> {
    let sections: [(&str, String); 6] = [
        ("General", to_pretty(&profile.general)?),
        ("Text analysis", to_pretty(&profile.text)?),
        ("Image analysis", to_pretty(&profile.images)?),
        ("Numeric analysis", to_pretty(&profile.numeric)?),
        ("Multimodal checks", to_pretty(&profile.multimodal)?),
        ("Recommendations", to_pretty(&profile.recommendations)?),
    ];
    let mut out = String::new();
    out.push_str("<!doctype html>\n<html>\n<head>\n  <meta charset=\"utf-8\" />\n");
    out.push_str("  <title>Multimodal Data Profile</title>\n  <style>\n");
    out.push_str(STYLE);
    out.push_str("\n  </style>\n</head>\n<body>\n  <h1>Multimodal Data Profile</h1>\n");
    for (title, body) in &sections {
        out.push_str(&format!(
            "\n  <div class=\"card\">\n    <h2>{title}</h2>\n    <pre>{}</pre>\n  </div>\n",
            escape_html(body)
        ));
    }
    out.push_str("\n</body>\n</html>\n");
    Ok(out)
}

/// Write the HTML report, creating parent directories as needed.
pub fn write_html_report(profile: &Profile, output_path: &Path) -> Result<()> {
    let html = render_html(profile)?;
    ensure_parent(output_path)?;
    std::fs::write(output_path, html)?;
    Ok(())
}

pub fn export_json(profile: &Profile, output_path: &Path) -> Result<()> {
    ensure_parent(output_path)?;
    let mut file = std::fs::File::create(output_path)?;
    serde_json::to_writer_pretty(&mut file, profile)?;
    Ok(())
}

pub fn print_summary(profile: &Profile) {
    println!("{:<16} {}", "Rows:", profile.general.total_rows);
    println!("{:<16} {}", "Columns:", profile.general.columns.len());
    println!("{:<16} {}", "Text cols:", profile.text.len());
    println!("{:<16} {}", "Image cols:", profile.images.len());
    println!("{:<16} {}", "Audio cols:", profile.audio.len());
    println!("{:<16} {}", "Numeric cols:", profile.numeric.len());
    println!(
        "{:<16} {} ({:.2}%)",
        "No modality:", profile.multimodal.missing_modalities_count, profile.multimodal.missing_modalities_percent
    );
    for note in &profile.recommendations.multimodal {
        println!("  - {note}");
    }
}

fn to_pretty<T: Serialize>(value: &T) -> Result<String> {
    Ok(serde_json::to_string_pretty(value)?)
}

fn ensure_parent(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    Ok(())
}

pub fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            _ => out.push(c),
        }
    }
    out
}

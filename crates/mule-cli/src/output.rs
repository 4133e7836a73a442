use mule_core::DispatchReport;
use serde::Serialize;

pub fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    println!("{}", json);
    Ok(())
}

/// Render a dispatch report as a two-column table, one row per instance.
pub fn render_report(report: &DispatchReport) -> String {
    let kind = report.executable.kind();
    let value = report.executable.value();
    if report.instances.is_empty() {
        return format!("no instances matched; {kind} {value} was not run\n");
    }

    let width = report
        .instances
        .iter()
        .map(|h| h.len())
        .chain(std::iter::once("INSTANCE".len()))
        .max()
        .unwrap_or(0);

    let mut out = String::new();
    out.push_str(&format!("{:width$}  {}\n", "INSTANCE", kind.to_uppercase()));
    out.push_str(&format!("{}  {}\n", "-".repeat(width), "-".repeat(kind.len())));
    for href in &report.instances {
        out.push_str(&format!("{href:width$}  {value}\n"));
    }
    out.push_str(&format!("\n{} instance(s)\n", report.instances.len()));
    out
}

pub fn print_report(report: &DispatchReport) {
    print!("{}", render_report(report));
}

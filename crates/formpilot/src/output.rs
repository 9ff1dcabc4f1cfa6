use formpilot_engine::profile::ProfileDefinition;
use formpilot_engine::protocol::SolverResult;

pub fn render_result(result: &SolverResult, json: bool) -> Result<String, serde_json::Error> {
    if json {
        return serde_json::to_string(result);
    }
    let status = if result.success { "ok" } else { "failed" };
    Ok(format!("[{}] {}", status, result.message))
}

pub fn render_profiles(profiles: &[&ProfileDefinition]) -> String {
    let width = profiles.iter().map(|p| p.id.len()).max().unwrap_or(0);
    profiles
        .iter()
        .map(|p| {
            format!(
                "{:width$}  {} ({})\n{:width$}  {}",
                p.id,
                p.name,
                p.short_description,
                "",
                p.url,
                width = width
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

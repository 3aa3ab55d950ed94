use backdrop_core::BackdropConfig;

/// Parse the JSON the host page passed to `mount`. Missing or malformed
/// input falls back to the stock configuration.
pub fn parse_config(json: Option<&str>) -> BackdropConfig {
    let Some(text) = json.map(str::trim).filter(|t| !t.is_empty() && *t != "null") else {
        return BackdropConfig::default();
    };
    match serde_json::from_str(text) {
        Ok(config) => config,
        Err(e) => {
            log::warn!("[mount] config ignored: {e}");
            BackdropConfig::default()
        }
    }
}

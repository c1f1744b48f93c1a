//! Config command implementation

use crate::output::OutputWriter;
use crate::output_types::{ConfigOutput, ConfigValue};
use anyhow::Result;
use meridian_core::config::{ConfigSource, LayeredConfig};
use tabled::Tabled;

#[derive(Tabled)]
struct ConfigRow {
    #[tabled(rename = "Key")]
    key: String,
    #[tabled(rename = "Value")]
    value: String,
    #[tabled(rename = "Source")]
    source: String,
}

fn value(entry: Option<&(String, ConfigSource)>) -> ConfigValue<String> {
    match entry {
        Some((value, source)) => {
            ConfigValue { value: value.clone(), source: format!("{:?}", source) }
        }
        None => ConfigValue { value: String::new(), source: "unset".to_string() },
    }
}

pub fn execute(config: &LayeredConfig, output: &OutputWriter) -> Result<()> {
    let map = config.to_inspection_map();

    let data = ConfigOutput {
        crs: value(map.get("crs")),
        geometry_validity: value(map.get("geometry_validity")),
        fix_antimeridian: value(map.get("fix_antimeridian")),
        crs_lookup: value(map.get("crs_lookup")),
    };

    let mut rows: Vec<ConfigRow> = map
        .into_iter()
        .map(|(key, (value, source))| ConfigRow { key, value, source: format!("{:?}", source) })
        .collect();
    rows.sort_by(|a, b| a.key.cmp(&b.key));

    output.emit_table(&data, "Effective Configuration", rows)
}

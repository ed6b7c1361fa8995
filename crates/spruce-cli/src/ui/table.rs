//! Scan-report tables.

use comfy_table::{ContentArrangement, Table, presets::UTF8_BORDERS_ONLY};

use spruce_schema::Ref;

/// Render a ref list as a table: id, arch, branch.
pub fn ref_table(refs: &[Ref]) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_BORDERS_ONLY)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(["Runtime / Extension", "Arch", "Branch"]);
    for r in refs {
        table.add_row([r.id.as_str(), r.arch.as_str(), r.branch.as_str()]);
    }
    table
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_each_ref_as_a_row() {
        let refs = vec![
            Ref::parse_runtime("org.kde.Platform/x86_64/5.15").unwrap(),
            Ref::parse_runtime("org.gnome.Platform/x86_64/44").unwrap(),
        ];
        let rendered = ref_table(&refs).to_string();
        assert!(rendered.contains("org.kde.Platform"));
        assert!(rendered.contains("org.gnome.Platform"));
        assert!(rendered.contains("5.15"));
    }
}

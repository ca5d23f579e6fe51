//! Interactive form rendering
//!
//! Every table becomes a `<form>` whose computed fields are read-only inputs. The scale input's
//! `onInput` handler holds one assignment per computed field:
//!
//! ```text
//! document.T.amountI.value = Math.round(document.S.scale.value * document.T.defaultI.value / P) * P;
//! ```
//!
//! where `T` is the table's form, `S` the form owning the scale input (the table itself, or a
//! standalone scale control) and `P` the rounding precision. The initial field values are
//! computed here with the same formula so the page is correct before any input event.

use crate::recipe::scale::{TableBinding, TableId};
use crate::recipe::table::IngredientTable;

/// Prepended once to every compiled document.
pub const DOCUMENT_HEADER: [&str; 2] = [
    r#"<dl><meta name="viewport" content="initial-scale=1"></dl>"#,
    r#"<style>form.ingredients input[readonly] { border: none; background: transparent; width: 6em; text-align: right; }</style>"#,
];

/// Renders a number without a decimal point when it is whole.
pub fn format_number(value: f64) -> String {
    if value == 0.0 {
        // covers -0.0
        return "0".to_string();
    }
    format!("{}", value)
}

/// `round(scale * default / precision) * precision`
pub fn scaled_amount(default: f64, scale: f64, precision: f64) -> f64 {
    (scale * default / precision).round() * precision
}

/// Formats a computed value with no more decimals than `precision` has, so identity scaling
/// reproduces the written amounts.
pub fn format_quantity(value: f64, precision: f64) -> String {
    let places = format_number(precision)
        .split_once('.')
        .map_or(0, |(_, fraction)| fraction.len());
    let mut text = format!("{:.*}", places, value);
    if text.contains('.') {
        let trimmed = text.trim_end_matches('0').trim_end_matches('.').len();
        text.truncate(trimmed);
    }
    if text == "-0" {
        text = "0".to_string();
    }
    text
}

pub fn escape_attribute(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '"' => escaped.push_str("&quot;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

fn recompute(table: &str, field: &str, default: &str, scale_form: &str, precision: f64) -> String {
    let precision = format_number(precision);
    format!(
        "document.{table}.{field}.value = Math.round(document.{scale_form}.scale.value * document.{table}.{default}.value / {precision}) * {precision};"
    )
}

/// One statement per row, then one for the total.
fn recompute_statements(
    table: &str,
    row_count: usize,
    has_total: bool,
    scale_form: &str,
    precision: f64,
) -> Vec<String> {
    let mut statements: Vec<String> = (0..row_count)
        .map(|i| {
            recompute(
                table,
                &format!("amount{}", i),
                &format!("default{}", i),
                scale_form,
                precision,
            )
        })
        .collect();
    if has_total {
        statements.push(recompute(
            table,
            "total",
            "default_total",
            scale_form,
            precision,
        ));
    }
    statements
}

fn scale_input(lines: &mut Vec<String>, label: &str, default_scale: f64, statements: &[String]) {
    lines.push("\t\t<!--scale controls-->".to_string());
    lines.push(format!(
        "\t\t{}: <input type=\"number\" name=\"scale\" value=\"{}\" min=\"0\" step=\"any\" onInput=\"",
        label,
        format_number(default_scale)
    ));
    lines.extend(statements.iter().map(|s| format!("\t\t\t{}", s)));
    lines.push("\t\t\">".to_string());
}

fn amount_cell(field: &str, value: &str, unit: &str) -> String {
    if unit.is_empty() {
        format!("\t\t\t\t<td><input name=\"{}\" value=\"{}\" readonly></td>", field, value)
    } else {
        format!(
            "\t\t\t\t<td><input name=\"{}\" value=\"{}\" readonly> {}</td>",
            field, value, unit
        )
    }
}

/// Rendering choices for one ingredient table.
#[derive(Debug, Clone)]
pub struct TableView<'a> {
    pub id: &'a TableId,
    pub title: Option<&'a str>,
    pub checkbox: bool,
    pub default_scale: f64,
    pub precision: f64,
    /// Label of the table's own scale input; `None` when a scale group drives the table.
    pub own_scale_label: Option<&'a str>,
}

pub fn render_table(table: &IngredientTable, view: &TableView<'_>) -> Vec<String> {
    let id = view.id.as_str();
    let mut lines = vec![
        "<dl>".to_string(),
        format!(
            "\t<form name=\"{}\" class=\"ingredients\" onsubmit=\"return false\">",
            id
        ),
    ];
    if let Some(title) = view.title {
        lines.push(format!("\t\t<h3>{}</h3>", title));
    }

    lines.push("\t\t<!--hardcoded default values-->".to_string());
    for (i, row) in table.rows().iter().enumerate() {
        lines.push(format!(
            "\t\t<input type=\"hidden\" name=\"default{}\" value=\"{}\">",
            i,
            escape_attribute(&row.amount)
        ));
    }
    if let Some(total) = table.total() {
        lines.push(format!(
            "\t\t<input type=\"hidden\" name=\"default_total\" value=\"{}\">",
            format_number(total)
        ));
    }

    if let Some(label) = view.own_scale_label {
        let statements =
            recompute_statements(id, table.len(), table.has_total(), id, view.precision);
        scale_input(&mut lines, label, view.default_scale, &statements);
        lines.push("\t\t<input type=\"reset\" value=\"Reset\">".to_string());
    }

    lines.push("\t\t<!--automatically calculated fields-->".to_string());
    lines.push("\t\t<table>".to_string());
    for (i, row) in table.rows().iter().enumerate() {
        let value = format_quantity(
            scaled_amount(row.quantity, view.default_scale, view.precision),
            view.precision,
        );
        let name = if view.checkbox {
            format!("<label><input type=\"checkbox\">{}</label>", row.name)
        } else {
            row.name.clone()
        };
        lines.push("\t\t\t<tr>".to_string());
        lines.push(format!("\t\t\t\t<td>{}</td>", name));
        lines.push(amount_cell(&format!("amount{}", i), &value, &row.unit));
        lines.push("\t\t\t</tr>".to_string());
    }
    if let Some(total) = table.total() {
        let value = format_quantity(
            scaled_amount(total, view.default_scale, view.precision),
            view.precision,
        );
        lines.push("\t\t\t<tr>".to_string());
        lines.push("\t\t\t\t<td>Total</td>".to_string());
        lines.push(amount_cell(
            "total",
            &value,
            table.total_unit().unwrap_or_default(),
        ));
        lines.push("\t\t\t</tr>".to_string());
    }
    lines.push("\t\t</table>".to_string());
    lines.push("\t</form>".to_string());
    lines.push("</dl>".to_string());
    lines
}

/// Rendering choices for one standalone scale control.
#[derive(Debug, Clone)]
pub struct ScaleView<'a> {
    pub form: &'a str,
    pub title: Option<&'a str>,
    pub label: &'a str,
    pub default_scale: f64,
    pub precision: f64,
}

/// Renders a standalone control driving every table in `bindings`, in binding order.
///
/// Its reset restores the control and then every bound table, so grouped tables never need a
/// reset of their own.
pub fn render_scale_control(view: &ScaleView<'_>, bindings: &[TableBinding]) -> Vec<String> {
    let mut lines = vec![
        "<dl>".to_string(),
        format!(
            "\t<form name=\"{}\" class=\"scale\" onsubmit=\"return false\">",
            view.form
        ),
    ];
    if let Some(title) = view.title {
        lines.push(format!("\t\t<h3>{}</h3>", title));
    }

    let statements: Vec<String> = bindings
        .iter()
        .flat_map(|binding| {
            recompute_statements(
                binding.table_id.as_str(),
                binding.row_count,
                binding.has_total,
                view.form,
                binding.precision.unwrap_or(view.precision),
            )
        })
        .collect();
    scale_input(&mut lines, view.label, view.default_scale, &statements);

    if bindings.is_empty() {
        lines.push("\t\t<input type=\"reset\" value=\"Reset\">".to_string());
    } else {
        let resets: Vec<String> = bindings
            .iter()
            .map(|binding| format!("document.{}.reset();", binding.table_id))
            .collect();
        lines.push(format!(
            "\t\t<input type=\"reset\" value=\"Reset\" onClick=\"{}\">",
            resets.join(" ")
        ));
    }

    lines.push("\t</form>".to_string());
    lines.push("</dl>".to_string());
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recipe::table::IngredientRow;
    use rstest::rstest;

    fn table(rows: &[&str]) -> IngredientTable {
        IngredientTable::from_rows(
            rows.iter()
                .map(|r| IngredientRow::parse(r, 1).unwrap())
                .collect(),
        )
    }

    fn view(id: &TableId) -> TableView<'_> {
        TableView {
            id,
            title: None,
            checkbox: false,
            default_scale: 1.0,
            precision: 0.001,
            own_scale_label: Some("batches"),
        }
    }

    #[rstest]
    #[case(1.0, "1")]
    #[case(2.0, "2")]
    #[case(0.5, "0.5")]
    #[case(-0.0, "0")]
    #[case(0.001, "0.001")]
    fn test_format_number(#[case] value: f64, #[case] expected: &str) {
        assert_eq!(format_number(value), expected);
    }

    #[rstest]
    #[case(200.0, 0.001, "200")]
    #[case(12.340000000000002, 0.001, "12.34")]
    #[case(0.30000000000000004, 0.01, "0.3")]
    #[case(2.4, 1.0, "2")]
    #[case(1.25, 0.25, "1.25")]
    fn test_format_quantity(#[case] value: f64, #[case] precision: f64, #[case] expected: &str) {
        assert_eq!(format_quantity(value, precision), expected);
    }

    #[test]
    fn test_scaled_amount() {
        assert_eq!(scaled_amount(200.0, 2.0, 1.0), 400.0);
        assert_eq!(scaled_amount(3.0, 0.5, 1.0), 2.0);
        assert_eq!(scaled_amount(3.0, 0.0, 0.5), 0.0);
    }

    #[test]
    fn test_escape_attribute() {
        assert_eq!(
            escape_attribute(r#"a "b" <c> & d"#),
            "a &quot;b&quot; &lt;c&gt; &amp; d"
        );
    }

    #[test]
    fn test_table_structure_order() {
        let id = TableId::generated(1);
        let lines = render_table(&table(&["Flour | 200 g", "Sugar | 50 g"]), &view(&id));
        let position = |needle: &str| {
            lines
                .iter()
                .position(|l| l.contains(needle))
                .unwrap_or_else(|| panic!("missing {}", needle))
        };

        assert!(position("name=\"default0\"") < position("name=\"default_total\""));
        assert!(position("name=\"default_total\"") < position("name=\"scale\""));
        assert!(position("name=\"scale\"") < position("type=\"reset\""));
        assert!(position("type=\"reset\"") < position("name=\"amount0\""));
        assert!(position("name=\"amount1\"") < position("name=\"total\""));
    }

    #[test]
    fn test_table_handler_statements() {
        let id = TableId::generated(1);
        let lines = render_table(&table(&["Flour | 200 g", "Sugar | 50 g"]), &view(&id));
        assert!(lines.contains(&"\t\t\tdocument.ingredients1.amount1.value = Math.round(document.ingredients1.scale.value * document.ingredients1.default1.value / 0.001) * 0.001;".to_string()));
        assert!(lines.contains(&"\t\t\tdocument.ingredients1.total.value = Math.round(document.ingredients1.scale.value * document.ingredients1.default_total.value / 0.001) * 0.001;".to_string()));
    }

    #[test]
    fn test_table_initial_scale() {
        let id = TableId::generated(1);
        let mut view = view(&id);
        view.default_scale = 2.0;
        let lines = render_table(&table(&["Flour | 200 g", "Sugar | 50 g"]), &view);

        assert!(lines.iter().any(|l| l.contains("value=\"2\" min=\"0\"")));
        assert!(lines.contains(&"\t\t\t\t<td><input name=\"amount0\" value=\"400\" readonly> g</td>".to_string()));
        assert!(lines.contains(&"\t\t\t\t<td><input name=\"amount1\" value=\"100\" readonly> g</td>".to_string()));
        assert!(lines.contains(&"\t\t\t\t<td><input name=\"total\" value=\"500\" readonly> g</td>".to_string()));
        assert!(lines.contains(&"\t\t<input type=\"hidden\" name=\"default0\" value=\"200\">".to_string()));
    }

    #[test]
    fn test_hidden_total_is_the_exact_sum() {
        let id = TableId::generated(1);
        let mut view = view(&id);
        view.precision = 1.0;
        let lines = render_table(&table(&["Flour | 200.5 g", "Sugar | 50 g"]), &view);

        // the handler rounds against this value, so it must not be pre-rounded
        assert!(lines.contains(&"\t\t<input type=\"hidden\" name=\"default_total\" value=\"250.5\">".to_string()));
        assert!(lines.contains(&"\t\t\t\t<td><input name=\"total\" value=\"251\" readonly> g</td>".to_string()));
    }

    #[test]
    fn test_grouped_table_has_no_control() {
        let id = TableId::generated(1);
        let mut view = view(&id);
        view.own_scale_label = None;
        let lines = render_table(&table(&["Flour | 200 g"]), &view);
        assert!(!lines.iter().any(|l| l.contains("name=\"scale\"")));
        assert!(!lines.iter().any(|l| l.contains("type=\"reset\"")));
        assert!(lines.iter().any(|l| l.contains("name=\"amount0\"")));
    }

    #[test]
    fn test_checkbox_and_title() {
        let id = TableId::generated(1);
        let mut view = view(&id);
        view.checkbox = true;
        view.title = Some("Dough");
        let lines = render_table(&table(&["Eggs | 2"]), &view);
        assert!(lines.contains(&"\t\t<h3>Dough</h3>".to_string()));
        assert!(lines.contains(&"\t\t\t\t<td><label><input type=\"checkbox\">Eggs</label></td>".to_string()));
        assert!(lines.contains(&"\t\t\t\t<td><input name=\"amount0\" value=\"2\" readonly></td>".to_string()));
    }

    #[test]
    fn test_scale_control_wires_bindings_in_order() {
        let bindings = vec![
            TableBinding {
                table_id: TableId::generated(1),
                row_count: 1,
                has_total: true,
                precision: None,
            },
            TableBinding {
                table_id: TableId::generated(2),
                row_count: 1,
                has_total: false,
                precision: Some(0.5),
            },
        ];
        let view = ScaleView {
            form: "scale_dough",
            title: None,
            label: "pizzas",
            default_scale: 1.0,
            precision: 0.01,
        };
        let lines = render_scale_control(&view, &bindings);
        let statements: Vec<&String> = lines.iter().filter(|l| l.contains(".value = ")).collect();

        assert_eq!(statements.len(), 3);
        assert_eq!(statements[0].trim(), "document.ingredients1.amount0.value = Math.round(document.scale_dough.scale.value * document.ingredients1.default0.value / 0.01) * 0.01;");
        assert!(statements[1].contains("document.ingredients1.total.value"));
        assert!(statements[2].ends_with("/ 0.5) * 0.5;"));
        assert!(lines.contains(&"\t\t<input type=\"reset\" value=\"Reset\" onClick=\"document.ingredients1.reset(); document.ingredients2.reset();\">".to_string()));
    }

    #[test]
    fn test_empty_scale_control_is_inert() {
        let view = ScaleView {
            form: "scale_none",
            title: Some("Scale"),
            label: "batches",
            default_scale: 0.5,
            precision: 0.001,
        };
        let lines = render_scale_control(&view, &[]);
        assert!(!lines.iter().any(|l| l.contains(".value = ")));
        assert!(lines.iter().any(|l| l.contains("name=\"scale\" value=\"0.5\"")));
        assert!(lines.contains(&"\t\t<input type=\"reset\" value=\"Reset\">".to_string()));
    }
}

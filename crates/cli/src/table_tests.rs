// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

fn render(table: &Table) -> String {
    let mut out = Vec::new();
    table.render(&mut out);
    String::from_utf8(out).unwrap()
}

#[test]
fn empty_table_renders_nothing() {
    let table = Table::plain(vec![Column::plain("ID")]);
    assert_eq!(render(&table), "");
}

#[test]
fn columns_align_to_the_widest_cell() {
    let mut table = Table::plain(vec![
        Column::muted("ID"),
        Column::plain("NAME"),
        Column::status("STATE"),
    ]);
    table.row(vec!["a1b2c3d4".into(), "patternplate".into(), "built".into()]);
    table.row(vec!["ff".into(), "x".into(), "errored".into()]);

    assert_eq!(
        render(&table),
        "ID        NAME          STATE\n\
         a1b2c3d4  patternplate  built\n\
         ff        x             errored\n"
    );
}

#[test]
fn long_values_are_truncated() {
    let mut table = Table::plain(vec![Column::plain("NAME").with_max(4), Column::plain("URL")]);
    table.row(vec!["patternplate".into(), "-".into()]);
    assert_eq!(render(&table), "NAME  URL\npatt  -\n");
}

#[test]
fn missing_cells_are_blank() {
    let mut table = Table::plain(vec![Column::plain("A"), Column::plain("B")]);
    table.row(vec!["x".into()]);
    assert_eq!(render(&table), "A  B\nx\n");
}

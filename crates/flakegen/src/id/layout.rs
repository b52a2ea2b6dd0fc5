use core::fmt;

/// One named bit field of a packed ID, as rendered by `Debug`.
pub(crate) struct FieldLayout {
    pub name: &'static str,
    pub bits: u64,
    pub value: u64,
}

impl FieldLayout {
    fn label(&self) -> String {
        format!("{} ({})", self.name, self.bits)
    }

    fn hex(&self) -> String {
        format!("0x{:x}", self.value)
    }

    fn width(&self) -> usize {
        let decimal = self.value.to_string().len();
        self.label().len().max(decimal).max(self.hex().len()) + 2
    }
}

const INDENT: &str = "        ";

fn write_border(f: &mut fmt::Formatter<'_>, widths: &[usize]) -> fmt::Result {
    write!(f, "{INDENT}+")?;
    for &width in widths {
        write!(f, "{:-<width$}+", "")?;
    }
    writeln!(f)
}

fn write_row<S: fmt::Display>(
    f: &mut fmt::Formatter<'_>,
    widths: &[usize],
    cells: impl Iterator<Item = S>,
) -> fmt::Result {
    write!(f, "{INDENT}|")?;
    for (cell, &width) in cells.zip(widths) {
        write!(f, "{:^width$}|", cell.to_string())?;
    }
    writeln!(f)
}

/// Renders an ID as a boxed table of its fields in decimal and hex.
pub(crate) fn write_bit_layout_debug(
    f: &mut fmt::Formatter<'_>,
    raw: u64,
    padded: &str,
    fields: &[FieldLayout],
    type_name: &str,
) -> fmt::Result {
    let widths: Vec<usize> = fields.iter().map(FieldLayout::width).collect();

    writeln!(f, "{type_name} {{")?;
    writeln!(f, "    raw id     : 0x{raw:016x} ({raw})")?;
    writeln!(f, "    padded     : {padded}")?;
    writeln!(f, "    layout     :")?;

    write_border(f, &widths)?;
    write_row(f, &widths, fields.iter().map(FieldLayout::label))?;
    write_border(f, &widths)?;
    write_row(f, &widths, fields.iter().map(|field| field.value))?;
    write_row(f, &widths, fields.iter().map(FieldLayout::hex))?;
    write_border(f, &widths)?;

    write!(f, "}}")
}

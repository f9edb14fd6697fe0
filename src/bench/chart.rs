use std::io::{self, Write};

use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;
use rgb::RGB8;

use super::Row;

const PANEL_PLOT_HEIGHT: usize = 240; // bar area height, pixels
const BAR_WIDTH: usize = 48;
const BAR_GAP: usize = 16;
const FONTSIZE: usize = 12; // base text size
const XPAD: usize = 40; // pad left and right of each panel
const YPAD1: usize = FONTSIZE * 4; // pad top, includes titles
const YPAD2: usize = FONTSIZE * 3; // pad bottom, includes tool labels
const HEADROOM: f64 = 1.2; // y-axis slack above the tallest bar

/// Bar fill colors, cycled per tool.
const PALETTE: [RGB8; 4] = [
    RGB8 {
        r: 0x4e,
        g: 0x79,
        b: 0xa7,
    },
    RGB8 {
        r: 0x59,
        g: 0xa1,
        b: 0x4f,
    },
    RGB8 {
        r: 0xf2,
        g: 0x8e,
        b: 0x2b,
    },
    RGB8 {
        r: 0xe1,
        g: 0x57,
        b: 0x59,
    },
];

/// Writes a grouped bar chart of benchmark means as an SVG document: one
/// panel per dataset, one colored bar per tool, mean labels above the bars.
///
/// Fails with [`io::ErrorKind::InvalidInput`] when there are no rows to
/// draw.
pub fn write_chart<W: Write>(rows: &[Row], writer: W) -> io::Result<()> {
    if rows.iter().all(|row| row.means.is_empty()) {
        return Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            "no benchmark results to chart",
        ));
    }
    render(rows, writer).map_err(|e| match e {
        quick_xml::Error::Io(e) => e,
        e => io::Error::new(io::ErrorKind::Other, e.to_string()),
    })
}

fn render<W: Write>(rows: &[Row], writer: W) -> quick_xml::Result<()> {
    let ntools = rows.iter().map(|row| row.means.len()).max().unwrap_or(0);
    let panel_width = 2 * XPAD + ntools * (BAR_WIDTH + BAR_GAP);
    let imagewidth = panel_width * rows.len();
    let imageheight = YPAD1 + PANEL_PLOT_HEIGHT + YPAD2;

    let mut svg = Writer::new(writer);
    svg.write_event(Event::Decl(BytesDecl::new("1.0", None, Some("no"))))?;

    let width = format!("{}", imagewidth);
    let height = format!("{}", imageheight);
    let viewbox = format!("0 0 {} {}", imagewidth, imageheight);
    svg.write_event(Event::Start(BytesStart::new("svg").with_attributes([
        ("version", "1.1"),
        ("width", width.as_str()),
        ("height", height.as_str()),
        ("viewBox", viewbox.as_str()),
        ("xmlns", "http://www.w3.org/2000/svg"),
    ])))?;

    rect(&mut svg, 0.0, 0.0, imagewidth as f64, imageheight as f64, "#eeeeee")?;
    text(
        &mut svg,
        imagewidth as f64 / 2.0,
        (FONTSIZE * 2) as f64,
        FONTSIZE + 5,
        "middle",
        "Flame graph benchmark (mean, ms)",
    )?;

    for (panel, row) in rows.iter().enumerate() {
        let left = (panel * panel_width) as f64;
        let ceiling = row
            .means
            .values()
            .fold(f64::MIN, |a, &b| a.max(b))
            .max(1e-9)
            * HEADROOM;

        text(
            &mut svg,
            left + panel_width as f64 / 2.0,
            (YPAD1 - FONTSIZE) as f64,
            FONTSIZE,
            "middle",
            &format!("{} samples", row.tag),
        )?;

        let baseline = (YPAD1 + PANEL_PLOT_HEIGHT) as f64;
        for (i, (name, &mean)) in row.means.iter().enumerate() {
            let color = PALETTE[i % PALETTE.len()];
            let fill = format!("rgb({},{},{})", color.r, color.g, color.b);
            let x = left + (XPAD + i * (BAR_WIDTH + BAR_GAP)) as f64;
            let bar = (mean / ceiling) * PANEL_PLOT_HEIGHT as f64;

            rect(&mut svg, x, baseline - bar, BAR_WIDTH as f64, bar, &fill)?;
            text(
                &mut svg,
                x + BAR_WIDTH as f64 / 2.0,
                baseline - bar - 4.0,
                FONTSIZE - 4,
                "middle",
                &format!("{:.1}", mean),
            )?;
            text(
                &mut svg,
                x + BAR_WIDTH as f64 / 2.0,
                baseline + FONTSIZE as f64 + 4.0,
                FONTSIZE - 2,
                "middle",
                name,
            )?;
        }
    }

    svg.write_event(Event::End(BytesEnd::new("svg")))?;
    svg.write_event(Event::Eof)?;
    Ok(())
}

fn rect<W: Write>(
    svg: &mut Writer<W>,
    x: f64,
    y: f64,
    width: f64,
    height: f64,
    fill: &str,
) -> quick_xml::Result<()> {
    let x = format!("{:.1}", x);
    let y = format!("{:.1}", y);
    let width = format!("{:.1}", width);
    let height = format!("{:.1}", height);
    svg.write_event(Event::Empty(BytesStart::new("rect").with_attributes([
        ("x", x.as_str()),
        ("y", y.as_str()),
        ("width", width.as_str()),
        ("height", height.as_str()),
        ("fill", fill),
    ])))?;
    Ok(())
}

fn text<W: Write>(
    svg: &mut Writer<W>,
    x: f64,
    y: f64,
    size: usize,
    anchor: &str,
    content: &str,
) -> quick_xml::Result<()> {
    let x = format!("{:.1}", x);
    let y = format!("{:.1}", y);
    let size = format!("{}", size);
    svg.write_event(Event::Start(BytesStart::new("text").with_attributes([
        ("text-anchor", anchor),
        ("x", x.as_str()),
        ("y", y.as_str()),
        ("font-size", size.as_str()),
        ("font-family", "Verdana"),
        ("fill", "rgb(0,0,0)"),
    ])))?;
    svg.write_event(Event::Text(BytesText::new(content)))?;
    svg.write_event(Event::End(BytesEnd::new("text")))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use indexmap::IndexMap;

    fn row(tag: &str, means: &[(&str, f64)]) -> Row {
        Row {
            tag: tag.to_string(),
            means: means
                .iter()
                .map(|(name, mean)| (name.to_string(), *mean))
                .collect(),
        }
    }

    #[test]
    fn chart_draws_one_bar_per_tool_per_dataset() {
        let rows = vec![
            row("small", &[("perl", 12.9), ("inferno", 5.3)]),
            row("large", &[("perl", 620.0), ("inferno", 181.4)]),
        ];
        let mut out = Vec::new();
        write_chart(&rows, &mut out).unwrap();
        let svg = String::from_utf8(out).unwrap();

        assert!(svg.starts_with("<?xml"));
        // one background rect plus four bars
        assert_eq!(svg.matches("<rect").count(), 5);
        assert!(svg.contains("small samples"));
        assert!(svg.contains("large samples"));
        assert!(svg.contains("</svg>"));
    }

    #[test]
    fn chart_requires_results() {
        let mut out = Vec::new();
        let err = write_chart(&[], &mut out).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidInput);
    }
}

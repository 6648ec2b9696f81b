use serde::{Deserialize, Serialize};
use sheetpack::geometry::Rect;
use svg::Document;
use svg::node::element::path::Data;
use svg::node::element::{Group, Path, Text, Title};

use crate::runner::RunReport;

#[derive(Copy, Clone, PartialEq, Debug, Default, Serialize, Deserialize)]
pub struct SvgDrawOptions {
    #[serde(default)]
    pub theme: SvgTheme,
    /// Draws the free rectangles tracked by the packer
    #[serde(default)]
    pub draw_free_rects: bool,
    /// Writes the item index in the center of each placement
    #[serde(default)]
    pub label_items: bool,
}

#[derive(Copy, Clone, PartialEq, Debug, Default, Serialize, Deserialize)]
pub enum SvgTheme {
    #[default]
    EarthTones,
    Gray,
}

impl SvgTheme {
    pub fn palette(&self) -> &'static SvgPalette {
        match self {
            SvgTheme::EarthTones => &EARTH_TONES_PALETTE,
            SvgTheme::Gray => &GRAY_PALETTE,
        }
    }
}

#[derive(Copy, Clone, PartialEq, Debug)]
pub struct SvgPalette {
    pub stroke_width_multiplier: f64,
    pub sheet_fill: &'static str,
    pub item_fill: &'static str,
    pub free_stroke: &'static str,
}

pub static EARTH_TONES_PALETTE: SvgPalette = SvgPalette {
    stroke_width_multiplier: 2.0,
    sheet_fill: "#CC824A",
    item_fill: "#FFC879",
    free_stroke: "#2D2D2D",
};

pub static GRAY_PALETTE: SvgPalette = SvgPalette {
    stroke_width_multiplier: 2.5,
    sheet_fill: "#C3C3C3",
    item_fill: "#8F8F8F",
    free_stroke: "#636363",
};

pub fn data_to_path(data: Data, params: &[(&str, &str)]) -> Path {
    let mut path = Path::new();
    for param in params {
        path = path.set(param.0, param.1)
    }
    path.set("d", data)
}

pub fn rect_data(rect: &Rect) -> Data {
    let (x_min, y_min) = (rect.x as f32, rect.y as f32);
    let (x_max, y_max) = (rect.right() as f32, rect.bottom() as f32);
    Data::new()
        .move_to((x_min, y_min))
        .line_to((x_max, y_min))
        .line_to((x_max, y_max))
        .line_to((x_min, y_max))
        .close()
}

/// Draws the sheet of a finished run with its placements (and optionally its free space).
pub fn layout_to_svg(report: &RunReport, options: SvgDrawOptions, title: &str) -> Document {
    let palette = options.theme.palette();
    let (width, height) = (report.bin_width as f64, report.bin_height as f64);

    let margin = 0.025 * f64::max(width, height);
    let vbox_svg = (-margin, -margin, width + 2.0 * margin, height + 2.0 * margin);

    let stroke_width = f64::min(width, height) * 0.001 * palette.stroke_width_multiplier;

    let sheet_group = {
        let sheet = Rect {
            x: 0,
            y: 0,
            width: report.bin_width,
            height: report.bin_height,
        };
        Group::new()
            .set("id", "sheet")
            .add(data_to_path(
                rect_data(&sheet),
                &[
                    ("fill", palette.sheet_fill),
                    ("stroke", "black"),
                    ("stroke-width", &*format!("{}", 2.0 * stroke_width)),
                ],
            ))
            .add(Title::new(format!(
                "sheet, {}x{}, occupancy: {:.3}%",
                report.bin_width,
                report.bin_height,
                report.occupancy * 100.0
            )))
    };

    let items_group = report
        .placed
        .iter()
        .fold(Group::new().set("id", "items"), |group, pi| {
            let mut item_group = Group::new()
                .add(data_to_path(
                    rect_data(&pi.rect),
                    &[
                        ("fill", palette.item_fill),
                        ("stroke", "black"),
                        ("stroke-width", &*format!("{stroke_width}")),
                        ("opacity", "0.9"),
                    ],
                ))
                .add(Title::new(format!("item, id: {}, rect: {}", pi.item, pi.rect)));
            if options.label_items {
                let font_size = 0.4 * f64::from(i32::min(pi.rect.width, pi.rect.height));
                let label = Text::new(format!("{}", pi.item))
                    .set("x", pi.rect.x as f64 + pi.rect.width as f64 / 2.0)
                    .set("y", pi.rect.y as f64 + pi.rect.height as f64 / 2.0)
                    .set("font-size", font_size)
                    .set("text-anchor", "middle")
                    .set("dominant-baseline", "middle");
                item_group = item_group.add(label);
            }
            group.add(item_group)
        });

    let free_group = match options.draw_free_rects {
        false => None,
        true => Some(report.free_rects.iter().fold(
            Group::new().set("id", "free_rects"),
            |group, rect| {
                group.add(
                    data_to_path(
                        rect_data(rect),
                        &[
                            ("fill", "none"),
                            ("stroke", palette.free_stroke),
                            ("stroke-width", &*format!("{stroke_width}")),
                            ("stroke-dasharray", &*format!("{}", 5.0 * stroke_width)),
                            ("stroke-linecap", "round"),
                        ],
                    )
                    .add(Title::new(format!("free, rect: {rect}"))),
                )
            },
        )),
    };

    let optionals = [free_group]
        .into_iter()
        .flatten()
        .fold(Group::new().set("id", "optionals"), |g, opt| g.add(opt));

    Document::new()
        .set("viewBox", vbox_svg)
        .add(Title::new(title.to_owned()))
        .add(sheet_group)
        .add(items_group)
        .add(optionals)
}

//! SVG rendering of the wind rose and the radial sector-average chart.
//!
//! Both charts are drawn on plain cartesian axes spanning `[-extent, extent]`
//! with polar shapes projected by hand. Angles follow the compass convention:
//! 0° points up (north) and angles grow clockwise.

use crate::colormap::Colormap;
use crate::config::ChartConfig;
use crate::rose::RoseTable;
use crate::sectors::RadialProfile;
use anyhow::Result;
use plotters::coord::Shift;
use plotters::coord::types::RangedCoordf64;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use plotters::style::{FontDesc, FontFamily, FontStyle};

pub const ROSE_TITLE: &str = "Wind Rose";
pub const RADIAL_TITLE: &str = "Radial Bar Plot of Wind Speed by Direction";

const COMPASS: [&str; 8] = ["N", "NE", "E", "SE", "S", "SW", "W", "NW"];
const N_RINGS: usize = 4;
const ARC_STEPS: usize = 24;
const CIRCLE_STEPS: usize = 120;
/// Fraction of a sector taken up by its wedge.
const WEDGE_OPENING: f64 = 0.8;

/// Draw the wind rose and return the SVG document.
pub fn wind_rose_svg(table: &RoseTable, cmap: &Colormap, chart: &ChartConfig) -> Result<String> {
    let mut svg = String::new();
    {
        let root =
            SVGBackend::with_string(&mut svg, (chart.width, chart.height)).into_drawing_area();
        draw_wind_rose(&root, table, cmap)?;
        root.present()?;
    }
    Ok(svg)
}

/// Draw the radial sector-average chart and return the SVG document.
pub fn radial_bar_svg(profile: &RadialProfile, chart: &ChartConfig) -> Result<String> {
    let mut svg = String::new();
    {
        let root =
            SVGBackend::with_string(&mut svg, (chart.width, chart.height)).into_drawing_area();
        draw_radial_bar(&root, profile)?;
        root.present()?;
    }
    Ok(svg)
}

fn draw_wind_rose<DB>(
    root: &DrawingArea<DB, Shift>,
    table: &RoseTable,
    cmap: &Colormap,
) -> Result<()>
where
    DB: DrawingBackend,
    DB::ErrorType: 'static,
{
    root.fill(&WHITE)?;

    let max_total = table.dir_totals().into_iter().fold(0.0, f64::max);
    let step = nice_step(max_total / N_RINGS as f64);
    let r_max = step * (max_total / step).ceil().max(1.0);
    let extent = r_max * 1.2;

    let mut chart = ChartBuilder::on(root)
        .caption(ROSE_TITLE, text_style(28.0))
        .margin(20)
        .build_cartesian_2d(-extent..extent, -extent..extent)?;

    draw_polar_grid(&mut chart, r_max, step, "%")?;

    for (i_label, label) in COMPASS.iter().enumerate() {
        let angle = 45.0 * i_label as f64;
        chart.draw_series(std::iter::once(Text::new(
            label.to_string(),
            polar(r_max * 1.1, angle),
            centred_text(16.0),
        )))?;
    }

    // Stack the speed bins outwards within each direction sector.
    let half_opening = table.dir_width() * WEDGE_OPENING / 2.0;
    let mut bases = vec![0.0; table.n_dir];
    let colors = cmap.colors(table.speed_labels.len());
    for (i_speed, (label, &color)) in table.speed_labels.iter().zip(&colors).enumerate() {
        let mut wedges = Vec::new();
        for (i_dir, base) in bases.iter_mut().enumerate() {
            let freq = table.freqs[i_dir][i_speed];
            if freq > 0.0 {
                let centre = table.dir_centre(i_dir);
                wedges.push(Polygon::new(
                    wedge(centre - half_opening, centre + half_opening, *base, *base + freq),
                    color.filled(),
                ));
                *base += freq;
            }
        }
        chart
            .draw_series(wedges)?
            .label(label.as_str())
            .legend(move |(x, y)| {
                Rectangle::new([(x, y - 6), (x + 12, y + 6)], color.filled())
            });
    }

    chart
        .configure_series_labels()
        .position(SeriesLabelPosition::UpperRight)
        .background_style(&WHITE.mix(0.8))
        .border_style(&BLACK)
        .label_font(text_style(13.0))
        .draw()?;

    Ok(())
}

fn draw_radial_bar<DB>(root: &DrawingArea<DB, Shift>, profile: &RadialProfile) -> Result<()>
where
    DB: DrawingBackend,
    DB::ErrorType: 'static,
{
    root.fill(&WHITE)?;

    let max_value = profile.max_value();
    let step = nice_step(max_value / N_RINGS as f64);
    let r_max = step * (max_value / step).ceil().max(1.0);
    let extent = r_max * 1.25;

    let mut chart = ChartBuilder::on(root)
        .caption(RADIAL_TITLE, text_style(24.0))
        .margin(20)
        .build_cartesian_2d(-extent..extent, -extent..extent)?;

    draw_polar_grid(&mut chart, r_max, step, "")?;

    let n_sectors = profile.n_sectors();
    for (angle, label) in profile.angles[..n_sectors].iter().zip(&profile.labels) {
        let angle = angle.to_degrees();
        chart.draw_series(std::iter::once(PathElement::new(
            vec![(0.0, 0.0), polar(r_max, angle)],
            BLACK.mix(0.15),
        )))?;
        chart.draw_series(std::iter::once(Text::new(
            label.clone(),
            polar(r_max * 1.12, angle),
            centred_text(14.0),
        )))?;
    }

    // Empty sectors sit at the centre.
    let outline: Vec<_> = profile
        .angles
        .iter()
        .zip(&profile.values)
        .map(|(&angle, &val)| {
            let r = if val.is_finite() { val } else { 0.0 };
            polar(r, angle.to_degrees())
        })
        .collect();
    chart.draw_series(std::iter::once(Polygon::new(
        outline.clone(),
        BLUE.mix(0.5).filled(),
    )))?;
    chart.draw_series(std::iter::once(PathElement::new(outline, BLUE.stroke_width(2))))?;

    Ok(())
}

fn draw_polar_grid<DB>(
    chart: &mut ChartContext<'_, DB, Cartesian2d<RangedCoordf64, RangedCoordf64>>,
    r_max: f64,
    step: f64,
    unit: &str,
) -> Result<()>
where
    DB: DrawingBackend,
    DB::ErrorType: 'static,
{
    let n_rings = (r_max / step).round() as usize;
    let decimals = tick_decimals(step);
    let label_color = BLACK.mix(0.6);
    for i_ring in 1..=n_rings {
        let r = step * i_ring as f64;
        let ring: Vec<_> = (0..=CIRCLE_STEPS)
            .map(|i| polar(r, 360.0 * i as f64 / CIRCLE_STEPS as f64))
            .collect();
        chart.draw_series(std::iter::once(PathElement::new(ring, BLACK.mix(0.2))))?;
        chart.draw_series(std::iter::once(Text::new(
            format!("{r:.decimals$}{unit}"),
            polar(r, 22.5),
            text_style(12.0).color(&label_color),
        )))?;
    }
    Ok(())
}

/// Project a radius and compass bearing (degrees) onto the plane.
pub fn polar(r: f64, bearing: f64) -> (f64, f64) {
    let theta = bearing.to_radians();
    (r * theta.sin(), r * theta.cos())
}

/// Annular wedge between two bearings and two radii, as a closed outline.
pub fn wedge(from: f64, to: f64, r_inner: f64, r_outer: f64) -> Vec<(f64, f64)> {
    let bearing = |i: usize| from + (to - from) * i as f64 / ARC_STEPS as f64;
    let mut points: Vec<_> = (0..=ARC_STEPS).map(|i| polar(r_outer, bearing(i))).collect();
    if r_inner > 0.0 {
        points.extend((0..=ARC_STEPS).rev().map(|i| polar(r_inner, bearing(i))));
    } else {
        points.push((0.0, 0.0));
    }
    points
}

/// Smallest of `{1, 2, 2.5, 5} * 10^k` not below `raw`.
pub fn nice_step(raw: f64) -> f64 {
    if !raw.is_finite() || raw <= 0.0 {
        return 1.0;
    }
    let magnitude = 10f64.powi(raw.log10().floor() as i32);
    [1.0, 2.0, 2.5, 5.0, 10.0]
        .into_iter()
        .map(|mult| mult * magnitude)
        .find(|&step| step >= raw * (1.0 - 1e-9))
        .unwrap_or(10.0 * magnitude)
}

fn tick_decimals(step: f64) -> usize {
    (0..4)
        .find(|&decimals| {
            let scaled = step * 10f64.powi(decimals as i32);
            (scaled - scaled.round()).abs() < 1e-9
        })
        .unwrap_or(4)
}

fn text_style(size: f64) -> TextStyle<'static> {
    TextStyle::from(FontDesc::new(FontFamily::SansSerif, size, FontStyle::Normal))
}

fn centred_text(size: f64) -> TextStyle<'static> {
    text_style(size).pos(Pos::new(HPos::Center, VPos::Center))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::WindSample;
    use crate::rose::SpeedBins;
    use crate::sectors::{Sectors, sector_averages};

    fn samples() -> Vec<WindSample> {
        [(1.0, 0.0), (2.0, 90.0), (3.0, 180.0), (4.0, 270.0), (12.0, 300.0)]
            .into_iter()
            .map(|(speed, direction)| WindSample { speed, direction })
            .collect()
    }

    #[test]
    fn compass_projection() {
        let (x, y) = polar(2.0, 0.0);
        assert!(x.abs() < 1e-12 && (y - 2.0).abs() < 1e-12);
        let (x, y) = polar(2.0, 90.0);
        assert!((x - 2.0).abs() < 1e-12 && y.abs() < 1e-12);
    }

    #[test]
    fn wedge_from_centre_is_closed_at_origin() {
        let points = wedge(-10.0, 10.0, 0.0, 1.0);
        assert_eq!(points.len(), ARC_STEPS + 2);
        assert_eq!(points.last(), Some(&(0.0, 0.0)));
        let ring_part = wedge(-10.0, 10.0, 1.0, 2.0);
        assert_eq!(ring_part.len(), 2 * (ARC_STEPS + 1));
    }

    #[test]
    fn nice_steps() {
        assert_eq!(nice_step(0.0), 1.0);
        assert_eq!(nice_step(0.7), 1.0);
        assert_eq!(nice_step(1.0), 1.0);
        assert_eq!(nice_step(2.2), 2.5);
        assert_eq!(nice_step(3.0), 5.0);
        assert_eq!(nice_step(7.5), 10.0);
        assert_eq!(nice_step(12.0), 20.0);
        assert_eq!(tick_decimals(2.5), 1);
        assert_eq!(tick_decimals(20.0), 0);
        assert_eq!(tick_decimals(0.25), 2);
    }

    #[test]
    fn rose_svg_has_title_and_legend() {
        let table = RoseTable::new(&samples(), &SpeedBins::default(), 16).unwrap();
        let cmap = Colormap::from_name("coolwarm").unwrap();
        let svg = wind_rose_svg(&table, &cmap, &ChartConfig::default()).unwrap();
        assert!(svg.contains("<svg"));
        assert!(svg.contains(ROSE_TITLE));
        assert!(svg.contains("[10 : 15)"));
        assert!(svg.contains("[20 : inf)"));
        assert!(svg.contains("<polygon"));
    }

    #[test]
    fn radial_svg_has_sector_labels() {
        let averages = sector_averages(&samples(), &Sectors::new(8).unwrap());
        let profile = RadialProfile::new(&averages).unwrap();
        let svg = radial_bar_svg(&profile, &ChartConfig::default()).unwrap();
        assert!(svg.contains(RADIAL_TITLE));
        for label in ["0-45", "90-135", "315-360"] {
            assert!(svg.contains(label), "missing {label}");
        }
        assert!(svg.contains("<polygon"));
    }
}

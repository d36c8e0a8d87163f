//! Text rendering of model results
//!
//! Each figure becomes a fixed-width table. Curves over the grid are sampled
//! every [`SAMPLE_STEP`] degrees plus every stimulus azimuth.

use std::fmt::Write;

use opchan_model::{CorticalResponse, ModelOutput};

use crate::Figure;

/// Spacing of curve rows in degrees
const SAMPLE_STEP: i32 = 10;

/// Render the requested figure(s)
pub fn render(output: &ModelOutput, figure: Figure) -> String {
    let mut out = String::new();
    let all = figure == Figure::All;

    if all || figure == Figure::Tuning {
        render_tuning(&mut out, output);
    }
    if all || figure == Figure::Gradient {
        render_gradient(&mut out, output);
    }
    if all || figure == Figure::Maa {
        render_maa(&mut out, output);
    }
    if all || figure == Figure::Response {
        for unit in &output.ac {
            render_response(&mut out, unit);
        }
    }
    out
}

/// Grid indices to print: regular samples plus stimulus locations
#[allow(clippy::cast_possible_truncation)]
fn sample_rows(output: &ModelOutput) -> Vec<usize> {
    let grid = &output.grid;
    let mut rows: Vec<usize> = (0..grid.len())
        .filter(|&i| (grid.azimuth_at(i) as i32).rem_euclid(SAMPLE_STEP) == 0)
        .chain(output.locations.grid_indices().iter().copied())
        .collect();
    rows.sort_unstable();
    rows.dedup();
    rows
}

fn channel_name(output: &ModelOutput, index: usize) -> String {
    let label = &output.chans[index].params.label;
    if label.is_empty() {
        format!("ch{index}")
    } else {
        label.clone()
    }
}

fn render_tuning(out: &mut String, output: &ModelOutput) {
    let _ = writeln!(out, "== Tuning curves ==");
    let _ = write!(out, "{:>8}", "az");
    for i in 0..output.chans.len() {
        let _ = write!(out, " {:>10}", channel_name(output, i));
    }
    let _ = writeln!(out);

    for idx in sample_rows(output) {
        let _ = write!(out, "{:>8.0}", output.grid.azimuth_at(idx));
        for chan in &output.chans {
            let _ = write!(out, " {:>10.4}", chan.tun[idx]);
        }
        let _ = writeln!(out);
    }
    let _ = writeln!(out);
}

fn render_gradient(out: &mut String, output: &ModelOutput) {
    let _ = writeln!(out, "== Gradients ==");
    let _ = write!(out, "{:>8}", "az");
    for i in 0..output.chans.len() {
        let _ = write!(out, " {:>10}", channel_name(output, i));
    }
    let _ = writeln!(out, " {:>10}", "sum");

    for idx in sample_rows(output) {
        let _ = write!(out, "{:>8.0}", output.grid.azimuth_at(idx));
        for chan in &output.chans {
            let _ = write!(out, " {:>10.5}", chan.grd[idx]);
        }
        let _ = writeln!(out, " {:>10.5}", output.pred.grads[idx]);
    }
    let _ = writeln!(out);
}

fn render_maa(out: &mut String, output: &ModelOutput) {
    let pred = &output.pred;
    let _ = writeln!(out, "== Predicted MAA (k = {:.4}) ==", pred.k);
    let _ = writeln!(out, "{:>8} {:>10} {:>10}", "az", "1/grad", "MAA (°)");
    for idx in sample_rows(output) {
        let _ = writeln!(
            out,
            "{:>8.0} {:>10.3} {:>10.3}",
            pred.refs[idx], pred.igrads[idx], pred.maas[idx]
        );
    }

    if !pred.data.is_empty() {
        let _ = writeln!(out);
        let _ = writeln!(
            out,
            "{:>8} {:>10} {:>8} {:>10} {:>10} {:>6}",
            "az", "observed", "ci", "predicted", "residual", "in ci"
        );
        match pred.compare_with_data() {
            Ok(rows) => {
                for row in rows {
                    let ci = row.ci.map_or_else(|| "-".to_string(), |ci| format!("{ci:.3}"));
                    let inside = match row.within_ci() {
                        Some(true) => "yes",
                        Some(false) => "no",
                        None => "-",
                    };
                    let _ = writeln!(
                        out,
                        "{:>8.0} {:>10.3} {:>8} {:>10.3} {:>+10.3} {:>6}",
                        row.azimuth,
                        row.observed,
                        ci,
                        row.predicted,
                        row.residual(),
                        inside
                    );
                }
            }
            Err(e) => {
                let _ = writeln!(out, "  behavioral data not comparable: {e}");
            }
        }
    }
    let _ = writeln!(out);
}

fn render_response(out: &mut String, unit: &CorticalResponse) {
    let _ = writeln!(
        out,
        "== Cortical response: {} (nAm; rows = pre, cols = post) ==",
        unit.params.label
    );
    let _ = write!(out, "{:>8}", "pre\\post");
    for az in &unit.azimuths {
        let _ = write!(out, " {az:>8.0}");
    }
    let _ = writeln!(out);

    for (az, row) in unit.azimuths.iter().zip(unit.resp.iter_rows()) {
        let _ = write!(out, "{az:>8.0}");
        for value in row {
            let _ = write!(out, " {value:>8.4}");
        }
        let _ = writeln!(out);
    }

    let _ = writeln!(out);
    let _ = writeln!(out, "{:>8} {:>10}", "shift", "mean");
    for (shift, mean) in unit.by_shift() {
        let _ = writeln!(out, "{shift:>+8.0} {mean:>10.4}");
    }
    let _ = writeln!(out);
}

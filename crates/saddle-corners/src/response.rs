//! Dense cornerness response from multi-orientation template correlation.

use saddle_corners_core::FloatImage;

use crate::template::{build_template, CorrelationTemplate, TEMPLATE_ANGLE_PAIRS};

/// Brightness polarity of a saddle hypothesis.
///
/// Sectors 0/1 sit on one diagonal of the X-corner and 2/3 on the other;
/// which diagonal is dark depends on the board phase under the corner, so
/// both hypotheses are evaluated and the stronger one wins.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Polarity {
    BlackOnWhite,
    WhiteOnBlack,
}

impl Polarity {
    pub const BOTH: [Polarity; 2] = [Polarity::BlackOnWhite, Polarity::WhiteOnBlack];

    #[inline]
    fn hypothesis(self, r: [f32; 4], mu: f32) -> f32 {
        match self {
            Polarity::BlackOnWhite => (r[0] - mu)
                .min(r[1] - mu)
                .min(mu - r[2])
                .min(mu - r[3]),
            Polarity::WhiteOnBlack => (mu - r[0])
                .min(mu - r[1])
                .min(r[2] - mu)
                .min(r[3] - mu),
        }
    }
}

/// Template radii derived from the sampling window size.
///
/// `{winsize + 3}`, plus `winsize − 3` for `winsize ≥ 8`. A zero (unset)
/// window size falls back to the default set `{6, 8, 10}`.
pub fn radii_for_winsize(winsize: usize) -> Vec<usize> {
    if winsize == 0 {
        return vec![6, 8, 10];
    }
    let mut radii = vec![winsize + 3];
    if winsize >= 8 {
        radii.push(winsize - 3);
    }
    radii
}

/// Correlate the field with one sparse sector kernel (replicate border).
fn correlate_sector(field: &FloatImage, taps: &[(i32, i32, f32)]) -> FloatImage {
    let mut out = FloatImage::zeros(field.width, field.height);
    for y in 0..field.height {
        for x in 0..field.width {
            let mut acc = 0.0f32;
            for &(dx, dy, w) in taps {
                acc += w * field.at_clamped(x as i32 + dx, y as i32 + dy);
            }
            out.set(x, y, acc);
        }
    }
    out
}

fn config_response(field: &FloatImage, template: &CorrelationTemplate) -> FloatImage {
    let responses: Vec<FloatImage> = template
        .sectors
        .iter()
        .map(|s| correlate_sector(field, &s.taps))
        .collect();

    let mut out = FloatImage::zeros(field.width, field.height);
    for i in 0..out.data.len() {
        let r = [
            responses[0].data[i],
            responses[1].data[i],
            responses[2].data[i],
            responses[3].data[i],
        ];
        let mu = (r[0] + r[1] + r[2] + r[3]) / 4.0;
        let best = Polarity::BOTH
            .iter()
            .map(|p| p.hypothesis(r, mu))
            .fold(f32::NEG_INFINITY, f32::max);
        out.data[i] = best;
    }
    out
}

/// Cornerness map: pixelwise maximum over all (radius, angle-pair)
/// template configurations.
///
/// The response is large at saddle points of either polarity and near zero
/// on flat regions and plain edges.
pub fn corner_response(field: &FloatImage, radii: &[usize]) -> FloatImage {
    let mut out = FloatImage::zeros(field.width, field.height);
    for &(a1, a2) in &TEMPLATE_ANGLE_PAIRS {
        for &radius in radii {
            let template = build_template(a1, a2, radius);
            let resp = config_response(field, &template);
            for (o, &v) in out.data.iter_mut().zip(resp.data.iter()) {
                if v > *o {
                    *o = v;
                }
            }
        }
    }
    out
}

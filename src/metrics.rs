//! Pixel metric kernels.
//!
//! Each kernel is a pure function over a [`PixelBuffer`] (or its cached
//! [`LumaPlane`]) that makes one or two linear scans and returns scalars
//! normalized to `[0, 1]`. Kernels share no state, so their order does not
//! matter; [`MetricSet::compute`] simply runs them all once.
//!
//! | Field | Kernel |
//! |---|---|
//! | `brightness_mean`, `dark_ratio`, `bright_ratio` | [`brightness_distribution`] |
//! | `contrast` | [`contrast`] |
//! | `saturation` | [`saturation`] |
//! | `edge_strength`, `detail_richness` | [`edges`] (3×3 Sobel over interior pixels) |
//! | `rule_of_thirds_interest` | [`rule_of_thirds`] |
//! | `center_focus` | [`center_focus`] |
//! | `subject_ratio`, `center_density` | [`subject_size`] |

use crate::config::KernelConfig;
use crate::imaging::{LumaPlane, PixelBuffer};
use serde::{Deserialize, Serialize};

/// Luma distance from mid-gray that the thirds and center kernels treat as "interest".
const MID_GRAY: f64 = 128.0;

/// Returned by [`center_focus`] when the center is no more interesting than the edges.
pub const NEUTRAL_CENTER_FOCUS: f64 = 0.5;

/// Means of identical values can differ in the last ulp.
const FOCUS_EPSILON: f64 = 1e-9;

type Kernel3 = [[f64; 3]; 3];

const SOBEL_KERNEL_X: Kernel3 = [[-1.0, 0.0, 1.0], [-2.0, 0.0, 2.0], [-1.0, 0.0, 1.0]];
const SOBEL_KERNEL_Y: Kernel3 = [[-1.0, -2.0, -1.0], [0.0, 0.0, 0.0], [1.0, 2.0, 1.0]];

/// Low-level statistics of one photo, every field in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MetricSet {
    pub brightness_mean: f64,
    pub dark_ratio: f64,
    pub bright_ratio: f64,
    pub contrast: f64,
    pub saturation: f64,
    pub edge_strength: f64,
    pub detail_richness: f64,
    pub rule_of_thirds_interest: f64,
    pub center_focus: f64,
    pub subject_ratio: f64,
    pub center_density: f64,
}

impl MetricSet {
    /// Run every kernel over `pixels`.
    pub fn compute(pixels: &PixelBuffer, config: &KernelConfig) -> Self {
        let luma = LumaPlane::from_pixels(pixels);
        let brightness = brightness_distribution(&luma, config);
        let edges = edges(&luma, config);
        let subject = subject_size(pixels, config);

        Self {
            brightness_mean: brightness.mean,
            dark_ratio: brightness.dark_ratio,
            bright_ratio: brightness.bright_ratio,
            contrast: contrast(&luma, config),
            saturation: saturation(pixels),
            edge_strength: edges.edge_strength,
            detail_richness: edges.detail_richness,
            rule_of_thirds_interest: rule_of_thirds(&luma, config),
            center_focus: center_focus(&luma, config),
            subject_ratio: subject.subject_ratio,
            center_density: subject.center_density,
        }
    }

    /// Copy with every field clamped into `[0, 1]` (NaN becomes 0).
    pub fn clamped(&self) -> Self {
        Self {
            brightness_mean: clamp_unit(self.brightness_mean),
            dark_ratio: clamp_unit(self.dark_ratio),
            bright_ratio: clamp_unit(self.bright_ratio),
            contrast: clamp_unit(self.contrast),
            saturation: clamp_unit(self.saturation),
            edge_strength: clamp_unit(self.edge_strength),
            detail_richness: clamp_unit(self.detail_richness),
            rule_of_thirds_interest: clamp_unit(self.rule_of_thirds_interest),
            center_focus: clamp_unit(self.center_focus),
            subject_ratio: clamp_unit(self.subject_ratio),
            center_density: clamp_unit(self.center_density),
        }
    }

    /// Field name / value pairs in declaration order, for display and assertions.
    pub fn fields(&self) -> [(&'static str, f64); 11] {
        [
            ("brightness_mean", self.brightness_mean),
            ("dark_ratio", self.dark_ratio),
            ("bright_ratio", self.bright_ratio),
            ("contrast", self.contrast),
            ("saturation", self.saturation),
            ("edge_strength", self.edge_strength),
            ("detail_richness", self.detail_richness),
            ("rule_of_thirds_interest", self.rule_of_thirds_interest),
            ("center_focus", self.center_focus),
            ("subject_ratio", self.subject_ratio),
            ("center_density", self.center_density),
        ]
    }
}

/// Clamp into `[0, 1]`, mapping NaN to 0.
#[inline]
pub fn clamp_unit(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BrightnessDistribution {
    pub mean: f64,
    pub dark_ratio: f64,
    pub bright_ratio: f64,
}

/// Mean luma plus dark/bright pixel ratios from a 256-bucket histogram.
pub fn brightness_distribution(luma: &LumaPlane, config: &KernelConfig) -> BrightnessDistribution {
    let values = luma.values();
    if values.is_empty() {
        return BrightnessDistribution {
            mean: 0.0,
            dark_ratio: 0.0,
            bright_ratio: 0.0,
        };
    }

    let mut histogram = [0usize; 256];
    let mut sum = 0.0;
    for &l in values {
        sum += l;
        histogram[(l as usize).min(255)] += 1;
    }

    let n = values.len() as f64;
    let dark_end = (config.dark_cutoff as usize).min(256);
    let bright_start = (config.bright_cutoff as usize + 1).min(256);
    let dark: usize = histogram[..dark_end].iter().sum();
    let bright: usize = histogram[bright_start..].iter().sum();

    BrightnessDistribution {
        mean: clamp_unit(sum / n / 255.0),
        dark_ratio: dark as f64 / n,
        bright_ratio: bright as f64 / n,
    }
}

/// Population standard deviation of luma, normalized by `contrast_divisor`.
pub fn contrast(luma: &LumaPlane, config: &KernelConfig) -> f64 {
    let values = luma.values();
    if values.is_empty() {
        return 0.0;
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let variance = values.iter().map(|l| (l - mean).powi(2)).sum::<f64>() / n;
    clamp_unit(variance.sqrt() / config.contrast_divisor)
}

/// Average HSV-style saturation `(max - min) / max`, 0 for black pixels.
pub fn saturation(pixels: &PixelBuffer) -> f64 {
    let n = pixels.pixel_count();
    if n == 0 {
        return 0.0;
    }
    let total: f64 = pixels
        .rgb_pixels()
        .map(|[r, g, b]| {
            let max = r.max(g).max(b);
            let min = r.min(g).min(b);
            if max == 0 {
                0.0
            } else {
                (max - min) as f64 / max as f64
            }
        })
        .sum();
    clamp_unit(total / n as f64)
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EdgeMetrics {
    pub edge_strength: f64,
    pub detail_richness: f64,
}

/// Sobel gradient magnitude over interior pixels.
///
/// The one-pixel border is excluded. Images narrower or shorter than three
/// pixels have no interior and score zero on both outputs.
pub fn edges(luma: &LumaPlane, config: &KernelConfig) -> EdgeMetrics {
    let (w, h) = (luma.width, luma.height);
    if w < 3 || h < 3 {
        return EdgeMetrics {
            edge_strength: 0.0,
            detail_richness: 0.0,
        };
    }

    let mut magnitude_sum = 0.0;
    let mut detailed = 0usize;
    for y in 1..h - 1 {
        for x in 1..w - 1 {
            let mut gx = 0.0;
            let mut gy = 0.0;
            for (ky, row) in SOBEL_KERNEL_X.iter().enumerate() {
                for (kx, wx) in row.iter().enumerate() {
                    let l = luma.at(x + kx - 1, y + ky - 1);
                    gx += wx * l;
                    gy += SOBEL_KERNEL_Y[ky][kx] * l;
                }
            }
            let magnitude = (gx * gx + gy * gy).sqrt();
            magnitude_sum += magnitude;
            if magnitude > config.detail_threshold {
                detailed += 1;
            }
        }
    }

    let interior = ((w - 2) * (h - 2)) as f64;
    EdgeMetrics {
        edge_strength: clamp_unit(magnitude_sum / interior / config.edge_divisor),
        detail_richness: clamp_unit(detailed as f64 / interior * config.detail_scale),
    }
}

/// The four rule-of-thirds intersections, using integer thirds.
pub fn thirds_points(width: usize, height: usize) -> [(usize, usize); 4] {
    let (tw, th) = (width / 3, height / 3);
    [(tw, th), (tw * 2, th), (tw, th * 2), (tw * 2, th * 2)]
}

/// Average `|luma - 128|` in a square window around each thirds point.
///
/// Windows are clipped to the image; each point contributes the mean over the
/// pixels it actually sampled.
pub fn rule_of_thirds(luma: &LumaPlane, config: &KernelConfig) -> f64 {
    let (w, h) = (luma.width as i64, luma.height as i64);
    let window = config.thirds_window as i64;
    let before = window / 2;
    let after = window - before;

    let mut total = 0.0;
    for (px, py) in thirds_points(luma.width, luma.height) {
        let (px, py) = (px as i64, py as i64);
        let x0 = (px - before).max(0);
        let x1 = (px + after).min(w);
        let y0 = (py - before).max(0);
        let y1 = (py + after).min(h);

        let mut interest = 0.0;
        let mut sampled = 0usize;
        for y in y0..y1 {
            for x in x0..x1 {
                interest += (luma.at(x as usize, y as usize) - MID_GRAY).abs();
                sampled += 1;
            }
        }
        if sampled > 0 {
            total += interest / sampled as f64;
        }
    }

    clamp_unit(total / 4.0 / MID_GRAY)
}

/// How much more "interesting" (far from mid-gray) the center disc is than the rim.
///
/// The center disc has radius `min(w, h) / center_radius_divisor`; the rim is
/// everything farther than twice that radius. Returns
/// [`NEUTRAL_CENTER_FOCUS`] unless the center mean strictly exceeds the rim mean.
pub fn center_focus(luma: &LumaPlane, config: &KernelConfig) -> f64 {
    let (w, h) = (luma.width, luma.height);
    let (cx, cy) = ((w / 2) as f64, (h / 2) as f64);
    let radius = w.min(h) as f64 / config.center_radius_divisor;

    let (mut center_sum, mut center_n) = (0.0, 0usize);
    let (mut edge_sum, mut edge_n) = (0.0, 0usize);
    for y in 0..h {
        let dy = y as f64 - cy;
        for x in 0..w {
            let dx = x as f64 - cx;
            let dist = (dx * dx + dy * dy).sqrt();
            let interest = (luma.at(x, y) - MID_GRAY).abs();
            if dist < radius {
                center_sum += interest;
                center_n += 1;
            } else if dist > radius * 2.0 {
                edge_sum += interest;
                edge_n += 1;
            }
        }
    }

    let center_mean = if center_n > 0 {
        center_sum / center_n as f64
    } else {
        0.0
    };
    let edge_mean = if edge_n > 0 {
        edge_sum / edge_n as f64
    } else {
        0.0
    };

    if center_mean - edge_mean > FOCUS_EPSILON {
        clamp_unit(center_mean / MID_GRAY)
    } else {
        NEUTRAL_CENTER_FOCUS
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SubjectMetrics {
    pub subject_ratio: f64,
    pub center_density: f64,
}

/// Horizontal-difference contrast of an interior pixel, averaged over RGB.
#[inline]
fn horizontal_contrast(pixels: &PixelBuffer, x: usize, y: usize) -> f64 {
    let left = pixels.rgb(x - 1, y);
    let here = pixels.rgb(x, y);
    let right = pixels.rgb(x + 1, y);
    let total: i32 = (0..3)
        .map(|c| {
            let v = here[c] as i32;
            (v - left[c] as i32).abs() + (v - right[c] as i32).abs()
        })
        .sum();
    total as f64 / 3.0
}

/// Share of the frame (and of its central third) covered by high-contrast pixels.
///
/// Only interior pixels can be marked; the ratios are taken over all pixels of
/// the frame and of the central `[w/3, 2w/3) × [h/3, 2h/3)` box respectively.
pub fn subject_size(pixels: &PixelBuffer, config: &KernelConfig) -> SubjectMetrics {
    let (w, h) = (pixels.width() as usize, pixels.height() as usize);
    let (bx0, bx1) = (w / 3, w * 2 / 3);
    let (by0, by1) = (h / 3, h * 2 / 3);
    let box_pixels = (bx1 - bx0) * (by1 - by0);

    let mut high = 0usize;
    let mut high_in_box = 0usize;
    if w >= 3 && h >= 3 {
        for y in 1..h - 1 {
            for x in 1..w - 1 {
                if horizontal_contrast(pixels, x, y) > config.subject_threshold {
                    high += 1;
                    if (bx0..bx1).contains(&x) && (by0..by1).contains(&y) {
                        high_in_box += 1;
                    }
                }
            }
        }
    }

    let center_density = if box_pixels > 0 {
        high_in_box as f64 / box_pixels as f64 * config.center_density_scale
    } else {
        0.0
    };
    SubjectMetrics {
        subject_ratio: clamp_unit(high as f64 / pixels.pixel_count() as f64 * config.subject_scale),
        center_density: clamp_unit(center_density),
    }
}

use super::*;
use crate::pixel::elem::PixelKind;
use crate::pixel::view::PixelBuf;

fn f64_view(values: &[f64], w: u32, h: u32) -> ImageView<'_> {
    ImageView::new(
        PixelBuf::new(bytemuck::cast_slice(values), PixelKind::F64),
        w,
        h,
    )
}

fn ones(n: usize) -> Vec<f64> {
    vec![1.0; n]
}

#[test]
fn covering_circle_sums_every_pixel_exactly() {
    // r is large enough that every pixel center sits deep inside the
    // aperture: all overlaps are exactly 1 and the result is the plain
    // sum of the image.
    let values: Vec<f64> = (0..64).map(f64::from).collect();
    let img = f64_view(&values, 8, 8);
    let out = sum_circle(
        &img,
        None,
        None,
        Circle::new(3.5, 3.5, 20.0),
        &SumOpts::default(),
    )
    .unwrap();

    assert_eq!(out.sum, 2016.0);
    assert_eq!(out.sum_err, 0.0);
    assert!(out.flags.truncated);
    assert!(!out.flags.has_masked);
}

#[test]
fn zero_radius_sums_nothing() {
    let values = ones(21 * 21);
    let img = f64_view(&values, 21, 21);
    let out = sum_circle(
        &img,
        None,
        None,
        Circle::new(10.3, 10.2, 0.0),
        &SumOpts::default(),
    )
    .unwrap();

    assert_eq!(out.sum, 0.0);
    assert_eq!(out.sum_err, 0.0);
    assert!(out.flags.is_empty());
}

#[test]
fn flux_converges_to_circle_area_with_finer_sampling() {
    let values = ones(21 * 21);
    let img = f64_view(&values, 21, 21);
    let circle = Circle::new(10.0, 10.0, 5.0);
    let area = std::f64::consts::PI * 25.0;

    let coarse = sum_circle(
        &img,
        None,
        None,
        circle,
        &SumOpts {
            subpix: 5,
            ..SumOpts::default()
        },
    )
    .unwrap();
    let fine = sum_circle(
        &img,
        None,
        None,
        circle,
        &SumOpts {
            subpix: 64,
            ..SumOpts::default()
        },
    )
    .unwrap();

    let rel_coarse = (coarse.sum - area).abs() / area;
    let rel_fine = (fine.sum - area).abs() / area;
    assert!(rel_coarse < 0.02, "subpix=5 off by {rel_coarse}");
    assert!(rel_fine < 0.002, "subpix=64 off by {rel_fine}");
    assert!(rel_fine <= rel_coarse + 1e-3);
    assert!(coarse.flags.is_empty());
}

#[test]
fn mask_correction_recovers_uniform_flux() {
    // Uniform image: flux scales with area, so excluding half the
    // aperture and correcting by area / goodarea lands back on the
    // unmasked estimate (up to summation order).
    let values: Vec<f64> = vec![2.0; 21 * 21];
    let img = f64_view(&values, 21, 21);
    let circle = Circle::new(10.0, 10.0, 5.0);
    let opts = SumOpts {
        subpix: 64,
        ..SumOpts::default()
    };

    let mask_values: Vec<f64> = (0..21 * 21)
        .map(|i| if i % 21 < 10 { 1.0 } else { 0.0 })
        .collect();
    let mask = Mask::new(
        PixelBuf::new(bytemuck::cast_slice(&mask_values), PixelKind::F64),
        0.5,
    );

    let plain = sum_circle(&img, None, None, circle, &opts).unwrap();
    let masked = sum_circle(&img, None, Some(&mask), circle, &opts).unwrap();

    assert!(masked.flags.has_masked);
    assert!(!plain.flags.has_masked);
    let rel = (masked.sum - plain.sum).abs() / plain.sum;
    assert!(rel < 1e-9, "correction drift {rel}");
}

#[test]
fn fully_masked_aperture_propagates_nan() {
    let values = ones(5 * 5);
    let img = f64_view(&values, 5, 5);
    let mask_values = ones(5 * 5);
    let mask = Mask::new(
        PixelBuf::new(bytemuck::cast_slice(&mask_values), PixelKind::F64),
        0.5,
    );

    let out = sum_circle(
        &img,
        None,
        Some(&mask),
        Circle::new(2.0, 2.0, 1.5),
        &SumOpts::default(),
    )
    .unwrap();

    assert!(out.flags.has_masked);
    assert!(out.sum.is_nan());
    assert!(out.sum_err.is_nan());
}

#[test]
fn edge_aperture_is_truncated_and_smaller() {
    let values = ones(21 * 21);
    let img = f64_view(&values, 21, 21);
    let opts = SumOpts::default();

    let centered = sum_circle(&img, None, None, Circle::new(10.0, 10.0, 5.0), &opts).unwrap();
    let clipped = sum_circle(&img, None, None, Circle::new(2.0, 10.0, 5.0), &opts).unwrap();

    assert!(!centered.flags.truncated);
    assert!(clipped.flags.truncated);
    assert!(clipped.sum > 0.0);
    assert!(clipped.sum < centered.sum);
}

#[test]
fn gain_adds_shot_noise_only_for_positive_flux() {
    let values = ones(21 * 21);
    let img = f64_view(&values, 21, 21);
    let circle = Circle::new(10.0, 10.0, 3.0);
    let opts = |gain: f64| SumOpts {
        gain,
        ..SumOpts::default()
    };

    let no_gain = sum_circle(&img, None, None, circle, &opts(0.0)).unwrap();
    let gain2 = sum_circle(&img, None, None, circle, &opts(2.0)).unwrap();
    let gain1 = sum_circle(&img, None, None, circle, &opts(1.0)).unwrap();

    assert_eq!(no_gain.sum, gain2.sum);
    assert_eq!(no_gain.sum, gain1.sum);
    assert_eq!(no_gain.sum_err, 0.0);
    // Lower gain, more shot noise.
    assert!(gain1.sum_err > gain2.sum_err);
    assert!(gain2.sum_err > 0.0);

    // Negative flux takes no Poisson term regardless of gain.
    let negatives: Vec<f64> = vec![-1.0; 21 * 21];
    let img = f64_view(&negatives, 21, 21);
    let a = sum_circle(&img, None, None, circle, &opts(0.0)).unwrap();
    let b = sum_circle(&img, None, None, circle, &opts(1.0)).unwrap();
    assert!(a.sum < 0.0);
    assert_eq!(a.sum_err, b.sum_err);
}

#[test]
fn scalar_and_per_pixel_noise_agree() {
    let values = ones(21 * 21);
    let img = f64_view(&values, 21, 21);
    let circle = Circle::new(10.0, 10.0, 4.0);
    let opts = SumOpts::default();

    let sigmas: Vec<f64> = vec![0.5; 21 * 21];
    let array_noise = Noise::per_pixel(
        PixelBuf::new(bytemuck::cast_slice(&sigmas), PixelKind::F64),
        NoiseKind::Stddev,
    );
    let scalar_sigma = Noise::scalar(0.5, NoiseKind::Stddev);
    let scalar_var = Noise::scalar(0.25, NoiseKind::Variance);

    let a = sum_circle(&img, Some(&array_noise), None, circle, &opts).unwrap();
    let b = sum_circle(&img, Some(&scalar_sigma), None, circle, &opts).unwrap();
    let c = sum_circle(&img, Some(&scalar_var), None, circle, &opts).unwrap();

    assert!(a.sum_err > 0.0);
    assert_eq!(a.sum_err, b.sum_err);
    assert_eq!(b.sum_err, c.sum_err);
    assert_eq!(a.sum, b.sum);
}

#[test]
fn integer_buffers_match_float_buffers() {
    let pattern: Vec<u16> = (0..21 * 21).map(|i| (i % 7) as u16).collect();
    let as_f64: Vec<f64> = pattern.iter().map(|&v| f64::from(v)).collect();
    let circle = Circle::new(10.0, 10.0, 4.5);
    let opts = SumOpts::default();

    let ints = ImageView::new(
        PixelBuf::new(bytemuck::cast_slice(&pattern), PixelKind::U16),
        21,
        21,
    );
    let floats = f64_view(&as_f64, 21, 21);

    let a = sum_circle(&ints, None, None, circle, &opts).unwrap();
    let b = sum_circle(&floats, None, None, circle, &opts).unwrap();
    assert_eq!(a.sum, b.sum);

    let signed: Vec<i32> = (0..21 * 21).map(|i| (i % 7) - 3).collect();
    let signed_f64: Vec<f64> = signed.iter().map(|&v| f64::from(v)).collect();
    let ints = ImageView::new(
        PixelBuf::new(bytemuck::cast_slice(&signed), PixelKind::I32),
        21,
        21,
    );
    let floats = f64_view(&signed_f64, 21, 21);

    let a = sum_circle(&ints, None, None, circle, &opts).unwrap();
    let b = sum_circle(&floats, None, None, circle, &opts).unwrap();
    assert_eq!(a.sum, b.sum);
}

#[test]
fn zero_subpix_is_rejected() {
    let values = ones(4);
    let img = f64_view(&values, 2, 2);
    let err = sum_circle(
        &img,
        None,
        None,
        Circle::new(1.0, 1.0, 1.0),
        &SumOpts {
            subpix: 0,
            ..SumOpts::default()
        },
    )
    .unwrap_err();
    assert!(matches!(err, ApphotError::Validation(_)));
}

#[test]
fn flag_bits_follow_wire_layout() {
    assert_eq!(ApertureFlags::default().bits(), 0);
    assert_eq!(
        ApertureFlags {
            truncated: true,
            has_masked: false,
        }
        .bits(),
        0b01
    );
    assert_eq!(
        ApertureFlags {
            truncated: false,
            has_masked: true,
        }
        .bits(),
        0b10
    );
    assert_eq!(
        ApertureFlags {
            truncated: true,
            has_masked: true,
        }
        .bits(),
        0b11
    );
    assert!(ApertureFlags::default().is_empty());
}

#[test]
fn results_and_options_serialize_stably() {
    let out = ApertureSum {
        sum: 2.0,
        sum_err: 1.0,
        flags: ApertureFlags {
            truncated: false,
            has_masked: true,
        },
    };
    assert_eq!(
        serde_json::to_value(out).unwrap(),
        serde_json::json!({
            "sum": 2.0,
            "sum_err": 1.0,
            "flags": { "truncated": false, "has_masked": true },
        })
    );

    let opts: SumOpts = serde_json::from_str("{}").unwrap();
    assert_eq!(opts, SumOpts::default());
    assert_eq!(opts.subpix, 5);
}

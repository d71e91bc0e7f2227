use leaderboard_rs::hue::{COLOR_SPACE, HueError, HueSequence, hue_for_index, try_hue};

#[test]
fn first_layers_match_bisection_order() {
    let expected = [180.0, 90.0, 270.0, 45.0, 135.0, 225.0, 315.0, 22.5];
    for (i, want) in expected.iter().enumerate() {
        assert_eq!(hue_for_index(i as u64), *want, "index {i}");
    }
}

#[test]
fn same_index_same_hue() {
    for i in [0u64, 1, 17, 1_000, 123_456_789] {
        assert_eq!(hue_for_index(i).to_bits(), hue_for_index(i).to_bits());
    }
}

#[test]
fn hues_stay_on_the_wheel() {
    for i in 0..10_000u64 {
        let h = hue_for_index(i);
        assert!((0.0..COLOR_SPACE).contains(&h), "index {i} -> {h}");
    }
    for i in [1u64 << 40, (1u64 << 53) + 7, u64::MAX / 3, u64::MAX] {
        let h = hue_for_index(i);
        assert!((0.0..COLOR_SPACE).contains(&h), "index {i} -> {h}");
    }
}

#[test]
fn completed_layers_are_evenly_spaced() {
    // The prefix 0..2^k - 1 (i.e. the first 2^k - 1 entries) plus the implicit
    // origin at 0° forms a grid with step 360 / 2^k.
    for k in 1..=12u32 {
        let len = (1u64 << k) - 1;
        let mut hues: Vec<f64> = (0..len).map(hue_for_index).collect();
        hues.sort_by(|a, b| a.partial_cmp(b).unwrap());
        let step = COLOR_SPACE / (1u64 << k) as f64;
        for (j, h) in hues.iter().enumerate() {
            let want = step * (j as f64 + 1.0);
            assert!((h - want).abs() < 1e-9, "k={k} j={j}: {h} vs {want}");
        }
    }
}

#[test]
fn each_layer_on_its_own_is_arithmetic() {
    // Layer k holds 2^k indices and spreads them with spacing 360 / 2^k.
    for k in 0..=10u32 {
        let first = (1u64 << k) - 1;
        let mut hues: Vec<f64> = (first..first + (1u64 << k)).map(hue_for_index).collect();
        hues.sort_by(|a, b| a.partial_cmp(b).unwrap());
        let diff = COLOR_SPACE / (1u64 << k) as f64;
        for w in hues.windows(2) {
            assert!((w[1] - w[0] - diff).abs() < 1e-9, "layer {k}");
        }
    }
}

#[test]
fn no_collisions_in_practical_range() {
    let mut seen: Vec<u64> = (0..4096u64).map(|i| hue_for_index(i).to_bits()).collect();
    seen.sort_unstable();
    seen.dedup();
    assert_eq!(seen.len(), 4096);
}

#[test]
fn appending_never_moves_earlier_hues() {
    let first_page: Vec<f64> = HueSequence::new().take(25).map(|(_, h)| h).collect();
    let longer: Vec<f64> = HueSequence::new().take(100).map(|(_, h)| h).collect();
    assert_eq!(&longer[..25], &first_page[..]);

    let second_page: Vec<(u64, f64)> = HueSequence::starting_at(25).take(75).collect();
    assert_eq!(second_page[0].0, 25);
    let joined: Vec<f64> = first_page
        .iter()
        .copied()
        .chain(second_page.iter().map(|(_, h)| *h))
        .collect();
    assert_eq!(joined, longer);
}

#[test]
fn invalid_float_input_is_never_a_hue() {
    assert_eq!(try_hue(f64::NAN), Err(HueError::NotANumber));
    assert_eq!(try_hue(f64::NEG_INFINITY), Err(HueError::Infinite));
    assert_eq!(try_hue(-3.0), Err(HueError::Negative(-3.0)));
    assert_eq!(try_hue(0.5), Err(HueError::Fractional(0.5)));
    assert_eq!(try_hue(7.0), Ok(22.5));
}

#[test]
fn errors_have_readable_messages() {
    assert_eq!(HueError::NotANumber.to_string(), "index is not a number");
    assert!(HueError::Negative(-1.0).to_string().contains("-1"));
}

use lockstep_fixed::fixed_math::ops::{fixed_div, fixed_mod, fixed_mul};
use lockstep_fixed::fixed_math::{approx_div, reciprocal};
use lockstep_fixed::SCALE;

/// (a, b, Mul, Div, Mod, Reciprocal(b), ApproxDiv) pinned bit-for-bit.
///
/// Any change here changes replays and breaks lockstep with older builds.
const GOLDEN: &[(i32, i32, i32, i32, i32, i32, i32)] = &[
    (196608, 131072, 393216, 98304, 65536, 32768, 98304),
    (458752, 131072, 917504, 229376, 65536, 32768, 229376),
    (-65536, 262144, -262144, -16384, 196608, 16384, -16384),
    (-65536, 4096, -4096, -1048576, 0, 1048576, -1048576),
    (123456, -654321, -1232603, -12365, 123456, -6564, -12366),
    (-98765432, 31337, -47226141, -206551085, 8792, 137057, -206550504),
    (2147483647, 65536, 2147483647, 2147483647, 65535, 65536, 2147483647),
    (-2147483648, 196608, -2147483648, -715827882, 65536, 21845, -715816960),
    (340025, -459751, -2385359, -48469, 340025, -9342, -48470),
    (1, 3, 0, 21845, 1, 1431655765, 21845),
    (-1, 196608, -3, 0, 196607, 21845, -1),
    (40000000, 50921472, 1015228928, 51480, 40000000, 84, 51269),
    (-17, -5, 0, 222822, 3, -858993459, 222822),
    (1073741824, 1073754169, 202260480, 65535, 1073741824, 4, 65536),
];

#[test]
fn test_golden_values_are_bit_exact() {
    for &(a, b, mul, div, modulo, recip, adiv) in GOLDEN {
        assert_eq!(fixed_mul(a, b), mul, "Mul({}, {})", a, b);
        assert_eq!(fixed_div(a, b), div, "Div({}, {})", a, b);
        assert_eq!(fixed_mod(a, b), modulo, "Mod({}, {})", a, b);
        assert_eq!(reciprocal(b), recip, "Reciprocal({})", b);
        assert_eq!(approx_div(a, b), adiv, "ApproxDiv({}, {})", a, b);
    }
}

/// Integrate a falling body for 1000 ticks and fold every intermediate into a
/// checksum. Both the final state and the checksum are pinned.
fn run_integration() -> (i32, i32, u64) {
    let dt = SCALE / 30;
    let acc = -(SCALE / 7);
    let mut pos: i32 = 0;
    let mut vel: i32 = 3 * SCALE + 1234;
    let mut checksum: u64 = 0;

    for _ in 0..1000 {
        vel = vel.wrapping_add(fixed_mul(acc, dt));
        pos = pos.wrapping_add(fixed_mul(vel, dt));

        let d = fixed_div(pos, if vel != 0 { vel } else { 1 });
        let ap = if vel != 0 { approx_div(pos, vel) } else { 0 };
        let md = fixed_mod(pos, 1000 * SCALE + 7);

        checksum = checksum
            .wrapping_mul(31)
            .wrapping_add(d as u32 as u64)
            .wrapping_add(ap as u32 as u64)
            .wrapping_add(md as u64);
    }

    (pos, vel, checksum)
}

#[test]
fn test_integration_matches_recorded_run() {
    let (pos, vel, checksum) = run_integration();
    assert_eq!(pos, 1388694);
    assert_eq!(vel, -114158);
    assert_eq!(checksum, 4563676276507107982);
}

#[test]
fn test_integration_is_repeatable_across_threads() {
    let handles: Vec<_> = (0..4).map(|_| std::thread::spawn(run_integration)).collect();
    let expected = run_integration();
    for handle in handles {
        assert_eq!(handle.join().unwrap(), expected, "Concurrent runs should agree bit-for-bit");
    }
}

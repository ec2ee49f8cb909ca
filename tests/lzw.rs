use gifcodec::lzw;
use gifcodec::Error;

// From http://www.matthewflickinger.com/lab/whatsinagif/lzw_image_data.asp.
const SAMPLE_IMAGE: [u8; 100] = [
    1, 1, 1, 1, 1, 2, 2, 2, 2, 2, 1, 1, 1, 1, 1, 2, 2, 2, 2, 2, //
    1, 1, 1, 1, 1, 2, 2, 2, 2, 2, 1, 1, 1, 0, 0, 0, 0, 2, 2, 2, //
    1, 1, 1, 0, 0, 0, 0, 2, 2, 2, 2, 2, 2, 0, 0, 0, 0, 1, 1, 1, //
    2, 2, 2, 0, 0, 0, 0, 1, 1, 1, 2, 2, 2, 2, 2, 1, 1, 1, 1, 1, //
    2, 2, 2, 2, 2, 1, 1, 1, 1, 1, 2, 2, 2, 2, 2, 1, 1, 1, 1, 1,
];

const SAMPLE_IMAGE_CODES: [u16; 36] = [
    4, 1, 6, 6, 2, 9, 9, 7, 8, 10, 2, 12, 1, 14, 15, 6, 0, 21, 0, 10, 7, 22,
    23, 18, 26, 7, 10, 29, 13, 24, 12, 18, 16, 36, 12, 5,
];

fn round_trip(min_code_size: u8, input: &[u8]) {
    let codes = lzw::encode(min_code_size, input).unwrap();
    assert_eq!(lzw::decode(&codes).unwrap(), input);

    // And again through the packed bit-level representation.
    let packed = lzw::pack(min_code_size, &codes);
    let unpacked = lzw::unpack(min_code_size, &packed).unwrap();
    assert_eq!(unpacked, codes);
    assert_eq!(lzw::decode(&unpacked).unwrap(), input);
}

#[test]
fn test_known_encoding() {
    let codes = lzw::encode(1, &[0, 1, 0, 1, 0, 1, 0, 1, 0]).unwrap();
    assert_eq!(codes, [2, 0, 1, 4, 6, 5, 3]);

    let codes = lzw::encode(2, &SAMPLE_IMAGE).unwrap();
    assert_eq!(codes, SAMPLE_IMAGE_CODES);
}

#[test]
fn test_known_decoding() {
    let indices = lzw::decode(&[2, 0, 1, 4, 6, 5, 3]).unwrap();
    assert_eq!(indices, [0, 1, 0, 1, 0, 1, 0, 1, 0]);

    let indices = lzw::decode(&SAMPLE_IMAGE_CODES).unwrap();
    assert_eq!(indices, SAMPLE_IMAGE);
}

#[test]
fn test_round_trip_simple() {
    round_trip(2, &SAMPLE_IMAGE);

    round_trip(
        6,
        &[
            19, 17, 18, 14, 28, 36, 36, 19, 36, 4, 7, 43, 50, 14, 4, 8, 2, 42,
            6, 38, 48, 53, 30, 43, 55, 9, 23, 29, 19, 7, 25, 63, 39, 58, 14,
            48, 29, 1, 48, 59, 3, 6, 4, 30, 13, 37, 4, 23, 48, 3, 13, 25, 43,
            51, 2, 36, 7, 17, 53, 53, 6, 55, 26, 14,
        ],
    );

    // Long runs exercise the decoder's one-entry-ahead special case.
    let mut runs = Vec::new();
    runs.extend(std::iter::repeat(1u8).take(64));
    runs.extend(std::iter::repeat(2u8).take(32));
    runs.extend(std::iter::repeat(0u8).take(32));
    round_trip(2, &runs);
}

#[test]
fn test_round_trip_tiny() {
    round_trip(2, &[0]);
    round_trip(2, &[3]);
    round_trip(2, &[0, 0]);
    round_trip(2, &[0, 1, 2, 3]);
    round_trip(8, &[255; 16]);
}

#[test]
fn test_round_trip_random() {
    use rand::prelude::*;
    use rand_distr::Uniform;

    let mut rng = StdRng::seed_from_u64(0x1f1f);
    for min_code_size in 2..=8u8 {
        let distr = Uniform::new(0, 1u16 << min_code_size);
        for length in [1, 7, 100, 5000] {
            let input: Vec<u8> = (0..length)
                .map(|_| distr.sample(&mut rng) as u8)
                .collect();
            round_trip(min_code_size, &input);
        }
    }
}

#[test]
fn test_table_reset_on_long_input() {
    use rand::prelude::*;
    use rand_distr::Uniform;

    // Random 8-bit data grows the table past the 12-bit ceiling, so the
    // encoder has to emit mid-stream clear codes and the decoder has to
    // honor them.
    let mut rng = StdRng::seed_from_u64(42);
    let distr = Uniform::new(0u16, 256);
    let input: Vec<u8> =
        (0..200_000).map(|_| distr.sample(&mut rng) as u8).collect();

    let clear = 256u16;
    let codes = lzw::encode(8, &input).unwrap();
    let resets = codes[1..].iter().filter(|&&c| c == clear).count();
    assert!(resets > 0, "expected at least one mid-stream reset");
    assert_eq!(lzw::decode(&codes).unwrap(), input);

    let packed = lzw::pack(8, &codes);
    assert_eq!(lzw::unpack(8, &packed).unwrap(), codes);
}

#[test]
fn test_codes_stay_in_range() {
    let input: Vec<u8> = (0..20_000).map(|i| (i % 251) as u8).collect();
    let codes = lzw::encode(8, &input).unwrap();
    assert!(codes.iter().all(|&c| c <= 4095));
    assert_eq!(lzw::decode(&codes).unwrap(), input);
}

#[test]
fn test_empty_input() {
    assert!(matches!(lzw::encode(2, &[]), Err(Error::EmptyIndexStream)));
    assert!(matches!(lzw::decode(&[]), Err(Error::EmptyIndexStream)));
}

#[test]
fn test_alphabet_violation() {
    // Index 7 does not fit a 2-bit alphabet.
    assert!(matches!(lzw::encode(2, &[7]), Err(Error::InvalidLzwCode(7))));
}

#[test]
fn test_unsupported_code_size() {
    assert!(matches!(
        lzw::encode(0, &[0]),
        Err(Error::UnsupportedCodeSize(0))
    ));
    assert!(matches!(
        lzw::encode(13, &[0]),
        Err(Error::UnsupportedCodeSize(13))
    ));
    assert!(matches!(
        lzw::unpack(200, &[0, 0, 0]),
        Err(Error::UnsupportedCodeSize(200))
    ));
}

#[test]
fn test_corrupt_code_stream() {
    // Clear code 4: the table holds six entries after seeding, so code 9
    // cannot be resolved.
    assert!(matches!(
        lzw::decode(&[4, 0, 9]),
        Err(Error::InvalidLzwCode(9))
    ));
    // The first code after a clear must be a plain index.
    assert!(matches!(
        lzw::decode(&[4, 6]),
        Err(Error::InvalidLzwCode(6))
    ));
}

#[test]
fn test_unpack_stops_at_end_of_information() {
    let codes = lzw::encode(2, &SAMPLE_IMAGE).unwrap();
    let mut packed = lzw::pack(2, &codes);
    // Trailing garbage after the end-of-information code is ignored.
    packed.extend_from_slice(&[0xff, 0xff, 0xff]);
    assert_eq!(lzw::unpack(2, &packed).unwrap(), codes);
}

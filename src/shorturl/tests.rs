use super::*;
use crate::common::io::LineSink;
use proptest::prelude::*;
use std::cmp::Ordering;

fn code(s: &str) -> Code {
    Code::try_from(s).unwrap()
}

fn cmp(a: &str, b: &str) -> Ordering {
    compare_codes(&code(a), &code(b))
}

// ---- Class precedence ----

#[test]
fn test_digit_before_lower() {
    assert_eq!(cmp("1", "a"), Ordering::Less);
    assert_eq!(cmp("9", "a"), Ordering::Less);
}

#[test]
fn test_lower_before_upper() {
    assert_eq!(cmp("a", "A"), Ordering::Less);
    assert_eq!(cmp("z", "A"), Ordering::Less);
}

#[test]
fn test_upper_before_other() {
    assert_eq!(cmp("A", "!"), Ordering::Less);
    assert_eq!(cmp("Z", "-"), Ordering::Less);
    assert_eq!(cmp("Z", "_"), Ordering::Less);
}

#[test]
fn test_byte_order_within_class() {
    assert_eq!(cmp("0", "9"), Ordering::Less);
    assert_eq!(cmp("b", "a"), Ordering::Greater);
    assert_eq!(cmp("B", "C"), Ordering::Less);
    assert_eq!(cmp("!", "-"), Ordering::Less);
}

#[test]
fn test_not_plain_byte_order() {
    // ASCII puts 'A' (0x41) before 'a' (0x61); codes do the opposite.
    assert!(b"A" < b"a");
    assert_eq!(cmp("A", "a"), Ordering::Greater);
}

#[test]
fn test_first_difference_decides() {
    assert_eq!(cmp("a0Z", "a1a"), Ordering::Less);
    assert_eq!(cmp("abZ", "abc"), Ordering::Greater);
    assert_eq!(cmp("0zzzzz", "a00000"), Ordering::Less);
}

#[test]
fn test_equal_codes() {
    assert_eq!(cmp("", ""), Ordering::Equal);
    assert_eq!(cmp("aB3", "aB3"), Ordering::Equal);
}

// ---- Unequal lengths: shorter prefix sorts first ----

#[test]
fn test_prefix_sorts_first() {
    assert_eq!(cmp("ab", "abc"), Ordering::Less);
    assert_eq!(cmp("abc", "ab"), Ordering::Greater);
}

#[test]
fn test_empty_code_is_lowest() {
    for s in ["0", "a", "A", "!", "zzzzzz"] {
        assert_eq!(cmp("", s), Ordering::Less, "{}", s);
    }
}

#[test]
fn test_length_does_not_override_content() {
    assert_eq!(cmp("b", "a0"), Ordering::Greater);
    assert_eq!(cmp("1", "a0000"), Ordering::Less);
}

#[test]
fn test_code_ord_matches_compare_codes() {
    let a = code("aZ");
    let b = code("a!");
    assert!(a < b);
    assert_eq!(a.cmp(&b), compare_codes(&a, &b));
    let mut codes = vec![code("B"), code("a"), code("1"), code("-"), code("")];
    codes.sort();
    let sorted: Vec<String> = codes.iter().map(|c| c.to_string()).collect();
    assert_eq!(sorted, ["", "1", "a", "B", "-"]);
}

#[test]
fn test_class_of() {
    assert_eq!(CodeClass::of(b'5'), CodeClass::Digit);
    assert_eq!(CodeClass::of(b'q'), CodeClass::Lower);
    assert_eq!(CodeClass::of(b'Q'), CodeClass::Upper);
    assert_eq!(CodeClass::of(b'~'), CodeClass::Other);
    assert_eq!(CodeClass::of(0xff), CodeClass::Other);
}

// ---- Code construction ----

#[test]
fn test_code_too_long() {
    assert_eq!(Code::try_from("abcdefg"), Err(CodeError::TooLong(7)));
    assert!(Code::try_from("abcdef").is_ok());
}

#[test]
fn test_code_forbidden_bytes() {
    assert_eq!(Code::try_from("a|b"), Err(CodeError::ForbiddenByte(b'|')));
    assert_eq!(Code::try_from("a\n"), Err(CodeError::ForbiddenByte(b'\n')));
}

#[test]
fn test_code_accessors() {
    let c = code("xY1");
    assert_eq!(c.as_bytes(), b"xY1");
    assert_eq!(c.len(), 3);
    assert!(!c.is_empty());
    assert!(Code::EMPTY.is_empty());
    assert_eq!(Code::default(), Code::EMPTY);
    assert_eq!(format!("{}", c), "xY1");
    assert_eq!(format!("{:?}", c), "Code(\"xY1\")");
}

// ---- Record decoding ----

#[test]
fn test_decode_simple() {
    let r = Record::decode(b"abc|http://example.com/\n", 1).unwrap();
    assert_eq!(r.code, code("abc"));
    assert_eq!(r.url, b"http://example.com/");
}

#[test]
fn test_decode_url_with_pipes() {
    let r = Record::decode(b"x|http://a/?q=1|2|3\n", 1).unwrap();
    assert_eq!(r.code, code("x"));
    assert_eq!(r.url, b"http://a/?q=1|2|3");
}

#[test]
fn test_decode_without_terminator() {
    let r = Record::decode(b"x|http://a/", 1).unwrap();
    assert_eq!(r.url, b"http://a/");
}

#[test]
fn test_decode_empty_url_and_code() {
    let r = Record::decode(b"|\n", 1).unwrap();
    assert!(r.code.is_empty());
    assert!(r.url.is_empty());
}

#[test]
fn test_decode_missing_separator() {
    let err = Record::decode(b"abc http://a/\n", 7).unwrap_err();
    assert_eq!(err.kind, ParseErrorKind::MissingSeparator);
    assert_eq!(err.line, 7);
    assert_eq!(err.content, "abc http://a/");
}

#[test]
fn test_decode_blank_line_is_error() {
    let err = Record::decode(b"\n", 3).unwrap_err();
    assert_eq!(err.kind, ParseErrorKind::MissingSeparator);
}

#[test]
fn test_decode_code_too_long() {
    let err = Record::decode(b"abcdefg|http://a/\n", 2).unwrap_err();
    assert_eq!(err.kind, ParseErrorKind::CodeTooLong(7));
    let msg = err.to_string();
    assert!(msg.contains("line 2"), "{}", msg);
    assert!(msg.contains("code too long"), "{}", msg);
}

#[test]
fn test_decode_code_only() {
    assert_eq!(decode_code(b"Ab|whatever\n", 1).unwrap(), code("Ab"));
    assert!(decode_code(b"nothing\n", 1).is_err());
}

#[test]
fn test_split_line_borrows_url() {
    let line = b"q|http://x/|y\n";
    let (c, url) = split_line(line).unwrap();
    assert_eq!(c, code("q"));
    assert_eq!(url, b"http://x/|y");
}

// ---- Encoding ----

#[test]
fn test_encode() {
    let r = Record::new(code("aZ9"), b"http://example.com/".to_vec());
    assert_eq!(r.encode(), b"aZ9|http://example.com/\n");
}

#[test]
fn test_write_record_matches_write_to() {
    let r = Record::new(code("q1"), b"http://x/?a|b".to_vec());
    let mut by_record = LineSink::new(Vec::new(), "a");
    r.write_to(&mut by_record).unwrap();
    let mut by_parts = LineSink::new(Vec::new(), "b");
    write_record(&mut by_parts, &r.code, &r.url).unwrap();
    assert_eq!(by_record.finish().unwrap(), b"q1|http://x/?a|b\n");
    assert_eq!(by_parts.finish().unwrap(), b"q1|http://x/?a|b\n");
}

#[test]
fn test_write_to_reports_write_failure() {
    struct Closed;
    impl std::io::Write for Closed {
        fn write(&mut self, _buf: &[u8]) -> std::io::Result<usize> {
            Err(std::io::Error::from(std::io::ErrorKind::BrokenPipe))
        }
        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }
    let r = Record::new(code("a"), b"u".to_vec());
    let mut sink = LineSink::new(Closed, "closed");
    assert!(matches!(
        r.write_to(&mut sink),
        Err(crate::error::Error::Io { .. })
    ));
}

#[test]
fn test_round_trip_exact_bytes() {
    let lines: [&[u8]; 4] = [
        b"a|http://example.com/\n",
        b"ZZZZZZ|http://x/?a=1|b=2\n",
        b"|\n",
        b"0|\xff\xfe binary\n",
    ];
    for line in lines {
        let r = Record::decode(line, 1).unwrap();
        assert_eq!(r.encode(), line);
    }
}

#[test]
fn test_compare_records_ignores_url() {
    let a = Record::new(code("a"), b"zzz".to_vec());
    let b = Record::new(code("a"), b"aaa".to_vec());
    assert_eq!(compare_records(&a, &b), Ordering::Equal);
}

// ---- Order laws ----

fn code_strategy() -> impl Strategy<Value = Code> {
    proptest::collection::vec(
        prop_oneof![
            proptest::char::range('0', '9'),
            proptest::char::range('a', 'z'),
            proptest::char::range('A', 'Z'),
            proptest::sample::select(vec!['-', '_', '!', '~']),
        ],
        0..=MAX_CODE_LENGTH,
    )
    .prop_map(|chars| {
        let s: String = chars.into_iter().collect();
        Code::try_from(s.as_str()).unwrap()
    })
}

proptest! {
    #[test]
    fn prop_reflexive(a in code_strategy()) {
        prop_assert_eq!(compare_codes(&a, &a), Ordering::Equal);
    }

    #[test]
    fn prop_antisymmetric(a in code_strategy(), b in code_strategy()) {
        prop_assert_eq!(compare_codes(&a, &b), compare_codes(&b, &a).reverse());
    }

    #[test]
    fn prop_equal_only_when_identical(a in code_strategy(), b in code_strategy()) {
        prop_assert_eq!(compare_codes(&a, &b) == Ordering::Equal, a == b);
    }

    #[test]
    fn prop_transitive(a in code_strategy(), b in code_strategy(), c in code_strategy()) {
        let mut v = [a, b, c];
        v.sort_by(compare_codes);
        prop_assert_ne!(compare_codes(&v[0], &v[1]), Ordering::Greater);
        prop_assert_ne!(compare_codes(&v[1], &v[2]), Ordering::Greater);
        prop_assert_ne!(compare_codes(&v[0], &v[2]), Ordering::Greater);
    }

    #[test]
    fn prop_round_trip(c in code_strategy(), url in "[ -{}~]{0,40}") {
        let mut line = Vec::new();
        line.extend_from_slice(c.as_bytes());
        line.push(b'|');
        line.extend_from_slice(url.as_bytes());
        line.push(b'\n');
        let r = Record::decode(&line, 1).unwrap();
        prop_assert_eq!(r.encode(), line);
    }
}

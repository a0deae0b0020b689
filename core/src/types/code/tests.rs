use super::*;

mod normalize {
    use super::*;

    #[test]
    fn uppercases_and_folds_ambiguous_letters() {
        assert_eq!(normalize("abc").as_deref(), Some("ABC"));
        assert_eq!(normalize("oOiIlL").as_deref(), Some("001111"));
        assert_eq!(normalize("stk9x").as_deref(), Some("STK9X"));
    }

    #[test]
    fn empty_input_is_valid() {
        assert_eq!(normalize("").as_deref(), Some(""));
    }

    #[test]
    fn rejects_u_in_either_case() {
        assert_eq!(normalize("U"), None);
        assert_eq!(normalize("abu"), None);
    }

    #[test]
    fn rejects_non_alphanumeric() {
        for input in ["AB-CD", "AB CD", "AB_CD", "ÄB", "ß", "AB\n", "12.3"] {
            assert_eq!(normalize(input), None, "input {input:?}");
        }
    }

    #[test]
    fn is_idempotent() {
        for input in ["abc", "OIL", "stk01", "zzz999", ""] {
            let once = normalize(input).unwrap();
            assert_eq!(normalize(&once).as_deref(), Some(once.as_str()));
        }
    }

    #[test]
    fn output_stays_in_alphabet() {
        let all: String = ('0'..='9')
            .chain('A'..='Z')
            .chain('a'..='z')
            .filter(|c| !c.eq_ignore_ascii_case(&'u'))
            .collect();
        let normalized = normalize(&all).unwrap();
        assert!(normalized.chars().all(is_alphabet_char));
    }
}

mod alphabet {
    use super::*;

    #[test]
    fn has_32_sorted_unique_symbols() {
        assert_eq!(ALPHABET.len(), 32);
        assert!(ALPHABET.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn excludes_ambiguous_letters() {
        for c in ['I', 'L', 'O', 'U'] {
            assert!(!is_alphabet_char(c));
        }
    }
}

mod code {
    use super::*;

    #[test]
    fn folds_on_construction() {
        let code = Code::try_new("stkoil".to_string()).unwrap();
        assert_eq!(code.as_str(), "STK011");
    }

    #[test]
    fn rejects_empty_and_invalid() {
        Code::try_new(String::new()).unwrap_err();
        Code::try_new("STKU".to_string()).unwrap_err();
        Code::try_new("ST K".to_string()).unwrap_err();
    }

    #[test]
    fn redb_round_trip() {
        let code = Code::try_new("ABC123".to_string()).unwrap();
        let bytes = <Code as redb::Value>::as_bytes(&code);
        assert_eq!(bytes, b"ABC123");
        assert_eq!(<Code as redb::Value>::from_bytes(bytes), code);
    }

    #[test]
    fn ordering_matches_string_ordering() {
        const CODES: [&str; 4] = ["A0", "A", "9Z", "B"];

        for l in CODES {
            for r in CODES {
                let code_l = Code::try_new(l.to_string()).unwrap();
                let code_r = Code::try_new(r.to_string()).unwrap();
                assert_eq!(code_l.cmp(&code_r), l.cmp(r), "comparing {l} and {r}");
                assert_eq!(
                    <Code as redb::Key>::compare(l.as_bytes(), r.as_bytes()),
                    l.cmp(r)
                );
            }
        }
    }
}

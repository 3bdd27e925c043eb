use penkit_gcode::{parse_line, GcodeValidator};
use proptest::prelude::*;

proptest! {
    #[test]
    fn validator_accepts_what_parser_accepts(line in "[ \\tGgMmXYxy0-9;().+-]{0,12}") {
        let validator = GcodeValidator::new().unwrap();
        prop_assert_eq!(validator.is_valid_line(&line), parse_line(&line).is_ok(), "line {:?}", line);
    }

    #[test]
    fn numbered_opcodes_agree(
        letter in "[GgMm]",
        number in 0u32..120,
        padded in any::<bool>(),
        tail in "( X[0-9]{1,3})?",
    ) {
        let line = if padded {
            format!("{}{:02}{}", letter, number, tail)
        } else {
            format!("{}{}{}", letter, number, tail)
        };
        let validator = GcodeValidator::new().unwrap();
        prop_assert_eq!(validator.is_valid_line(&line), parse_line(&line).is_ok(), "line {:?}", line);
    }
}

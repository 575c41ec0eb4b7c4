use proptest::prelude::*;
use ro_prefix_patcher::{
    apply_patches, plan_patches, ro_prefix_patches, ApplicationError, ApplyOptions,
    DEFAULT_TARGET,
};
use std::fs;

fn cui_block() -> String {
    ro_prefix_patches().unwrap().patches[3]
        .query
        .search()
        .to_string()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// Content without the CUI block is never written.
    #[test]
    fn file_without_required_block_is_untouched(content in "[ -~\n]{0,400}") {
        prop_assume!(!content.contains(&cui_block()));

        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join(DEFAULT_TARGET);
        fs::create_dir_all(target.parent().unwrap()).unwrap();
        fs::write(&target, &content).unwrap();

        let result = apply_patches(&ro_prefix_patches().unwrap(), dir.path(), ApplyOptions::default());
        prop_assert!(
            matches!(result, Err(ApplicationError::MissingRequired { .. })),
            "unexpected result: {:?}", result
        );
        prop_assert_eq!(fs::read_to_string(&target).unwrap(), content);
    }

    /// Surrounding text is carried over byte for byte.
    #[test]
    fn text_around_the_cui_block_is_preserved(
        prefix in "[a-z \n]{0,80}",
        suffix in "[a-z \n]{0,80}",
    ) {
        let config = ro_prefix_patches().unwrap();
        let input = format!("{prefix}{}{suffix}", cui_block());

        let plan = plan_patches(&config, &input).unwrap();

        prop_assert!(plan.patched.starts_with(&prefix));
        prop_assert!(plan.patched.ends_with(&suffix));
        prop_assert!(plan.patched.contains(r#"type="checkbox""#));
    }

    /// Changing any single character of the CUI block makes the run abort.
    #[test]
    fn any_single_char_change_aborts(index in 0usize..10_000, replacement in "[#@~]") {
        let block = cui_block();
        let chars: Vec<char> = block.chars().collect();
        let index = index % chars.len();

        let mut altered: String = chars[..index].iter().collect();
        altered.push_str(&replacement);
        altered.extend(&chars[index + 1..]);
        prop_assume!(altered != block);

        let err = plan_patches(&ro_prefix_patches().unwrap(), &altered).unwrap_err();
        prop_assert!(
            matches!(err, ApplicationError::MissingRequired { .. }),
            "unexpected error: {:?}", err
        );
    }
}

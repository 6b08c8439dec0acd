use rollcall_core::{parse_roster_csv, Identity};
use std::collections::BTreeSet;

fn expected_count(text: &str) -> usize {
    text.split('\n')
        .map(|line| line.strip_suffix('\r').unwrap_or(line))
        .filter_map(|line| {
            let (id, rest) = line.split_once(',')?;
            let name = rest.split(',').collect::<Vec<_>>().join(" ");
            (!id.trim().is_empty() && !name.trim().is_empty()).then(|| id.trim().to_string())
        })
        .collect::<BTreeSet<_>>()
        .len()
}

#[test]
fn imported_count_matches_distinct_well_formed_lines() {
    let inputs = [
        "1,Ana\n2,Bo\n3,Cy",
        "1,Ana\r\n1,Ana Again\r\n2,Bo\r\n",
        "\n\n1,Ana\n   \n,\n2\n3, ,\n4,,Dee\n",
        "a,b,c,d,e\nA,b\n a ,dup\n",
        "id,name\n10,Ten\n",
    ];

    for input in inputs {
        let import = parse_roster_csv(input);
        assert_eq!(import.imported_count, expected_count(input), "input: {input:?}");
        assert_eq!(import.imported_count, import.roster.len());
    }
}

#[test]
fn sample_file_matches_documented_outcome() {
    let import = parse_roster_csv("7,Sam\n,NoId\n9\n8,Kim,Park");

    assert_eq!(import.imported_count, 2);
    assert_eq!(import.skipped_lines, vec![2, 3]);
    let entries: Vec<(String, String)> = import
        .roster
        .iter()
        .map(|(id, name)| (id.to_string(), name.to_string()))
        .collect();
    assert_eq!(
        entries,
        vec![
            ("7".to_string(), "Sam".to_string()),
            ("8".to_string(), "Kim Park".to_string()),
        ]
    );
}

#[test]
fn extra_fields_are_joined_into_name() {
    let import = parse_roster_csv("4,,Dee\n5,Mary,Ann,Smith");
    assert_eq!(
        import.roster.get(&Identity::parse("4").unwrap()),
        Some("Dee")
    );
    assert_eq!(
        import.roster.get(&Identity::parse("5").unwrap()),
        Some("Mary Ann Smith")
    );
}

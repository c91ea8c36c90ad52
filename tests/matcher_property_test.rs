use nfa_regex::{Anchor, Ast, Cursor, Matcher, Quantifier, Regex, Unit};
use proptest::collection::vec;
use proptest::prelude::*;

fn quantifier_strategy() -> BoxedStrategy<Quantifier> {
    let kind = prop_oneof![
        Just(Quantifier::zero_or_more()),
        Just(Quantifier::one_or_more()),
        Just(Quantifier::zero_or_one()),
        (0usize..2, 0usize..2).prop_map(|(lo, extra)| Quantifier::range(lo, Some(lo + extra))),
        (0usize..2).prop_map(|lo| Quantifier::range(lo, None)),
    ];
    (kind, any::<bool>())
        .prop_map(|(q, lazy)| if lazy { q.lazy() } else { q })
        .boxed()
}

fn unit_strategy() -> BoxedStrategy<Unit> {
    let leaf = prop_oneof![
        Just(Unit::literal('a')),
        Just(Unit::literal('b')),
        Just(Unit::string("ab")),
        Just(Unit::AnyCharacter),
        Just(Unit::sequence(vec![])),
        Just(Unit::Anchor(Anchor::WordBoundary)),
        Just(Unit::Anchor(Anchor::EndOfString)),
    ];
    leaf.prop_recursive(3, 16, 3, |inner| {
        prop_oneof![
            vec(inner.clone(), 0..3).prop_map(Unit::sequence),
            vec(inner.clone(), 1..3).prop_map(Unit::alternation),
            vec(inner.clone(), 0..3).prop_map(Unit::non_capturing),
            (inner, quantifier_strategy()).prop_map(|(u, q)| Unit::quantified(u, q)),
        ]
    })
    .prop_map(|mut unit| {
        let mut next = 1;
        number_groups(&mut unit, &mut next);
        unit
    })
    .boxed()
}

/// Turn every group into a capturing group, numbered in pre-order.
fn number_groups(unit: &mut Unit, next: &mut usize) {
    match unit {
        Unit::Group(group) => {
            group.is_capturing = true;
            group.index = Some(*next);
            *next += 1;
            for child in &mut group.children {
                number_groups(child, next);
            }
        }
        Unit::ImplicitGroup(children) | Unit::Alternation(children) => {
            for child in children {
                number_groups(child, next);
            }
        }
        Unit::QuantifiedExpression { expression, .. } => number_groups(expression, next),
        _ => {}
    }
}

fn text_strategy() -> impl Strategy<Value = String> {
    "[ab ]{0,6}"
}

/// Leftmost-first reference for an alternation of literals.
fn literal_alternation_oracle(alternatives: &[String], text: &str) -> Option<(usize, usize)> {
    let chars: Vec<char> = text.chars().collect();
    for offset in 0..=chars.len() {
        for alt in alternatives {
            let alt: Vec<char> = alt.chars().collect();
            if chars[offset..].starts_with(&alt) {
                return Some((offset, offset + alt.len()));
            }
        }
    }
    None
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 256,
        failure_persistence: None,
        .. ProptestConfig::default()
    })]

    #[test]
    fn rematching_at_match_start_reproduces_the_match(root in unit_strategy(), text in text_strategy()) {
        let re = Regex::new(&Ast::new(root)).unwrap();
        let found = re.find(&text);
        prop_assert!(found.is_ok(), "search did not terminate within the step limit");
        if let Some(first) = found.unwrap() {
            prop_assert!(first.start() <= first.end());
            prop_assert!(first.end() <= text.chars().count());
            let mut cursor = Cursor::new(&text);
            let again = Matcher::new(re.automaton()).match_at(&mut cursor, first.start()).unwrap();
            prop_assert_eq!(again, Some(first));
        }
    }

    #[test]
    fn group_spans_lie_inside_the_match(root in unit_strategy(), text in text_strategy()) {
        let re = Regex::new(&Ast::new(root)).unwrap();
        if let Some(m) = re.find(&text).unwrap() {
            for (_, span) in m.groups() {
                prop_assert!(span.start <= span.end);
                prop_assert!(m.start() <= span.start && span.end <= m.end());
            }
        }
    }

    #[test]
    fn literal_alternation_is_leftmost_first(
        alternatives in vec("[ab]{1,3}", 1..4),
        text in "[ab]{0,8}",
    ) {
        let root = Unit::alternation(alternatives.iter().map(|s| Unit::string(s)).collect());
        let re = Regex::new(&Ast::new(root)).unwrap();
        let found = re.find(&text).unwrap().map(|m| (m.start(), m.end()));
        prop_assert_eq!(found, literal_alternation_oracle(&alternatives, &text));
    }

    #[test]
    fn bounded_repeat_accepts_exactly_its_range(lo in 0usize..4, extra in 0usize..4, n in 0usize..9) {
        let hi = lo + extra;
        let root = Unit::sequence(vec![
            Unit::repeat(Unit::literal('a'), lo, Some(hi)),
            Unit::Anchor(Anchor::EndOfString),
        ]);
        let re = Regex::new(&Ast::anchored(root)).unwrap();
        let text = "a".repeat(n);
        prop_assert_eq!(re.is_match(&text).unwrap(), lo <= n && n <= hi);
    }

    #[test]
    fn star_agrees_with_optional_plus(body in unit_strategy(), lazy in any::<bool>(), text in text_strategy()) {
        let (star, plus) = if lazy {
            (Quantifier::zero_or_more().lazy(), Quantifier::one_or_more().lazy())
        } else {
            (Quantifier::zero_or_more(), Quantifier::one_or_more())
        };
        let optional = if lazy { Quantifier::zero_or_one().lazy() } else { Quantifier::zero_or_one() };
        let star_re = Regex::new(&Ast::new(Unit::quantified(body.clone(), star))).unwrap();
        let plus_re = Regex::new(&Ast::new(Unit::quantified(Unit::quantified(body, plus), optional))).unwrap();
        // Nested random loops can hit the step ceiling; only finished searches are compared
        let (Ok(star_found), Ok(plus_found)) = (star_re.find(&text), plus_re.find(&text)) else {
            return Ok(());
        };
        prop_assert_eq!(star_found, plus_found);
    }

    #[test]
    fn find_iter_matches_do_not_overlap(root in unit_strategy(), text in text_strategy()) {
        let re = Regex::new(&Ast::new(root)).unwrap();
        let mut last_end = 0;
        let mut last_was_empty = false;
        for (i, m) in re.find_iter(&text).enumerate() {
            let m = m.unwrap();
            if i > 0 {
                prop_assert!(m.start() >= last_end);
                if last_was_empty {
                    prop_assert!(m.start() > last_end);
                }
            }
            last_end = m.end();
            last_was_empty = m.is_empty();
        }
    }
}

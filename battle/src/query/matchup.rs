//! Type matchup helpers for decision making

use crate::types::{ElementType, effectiveness};

/// Floor applied to incoming effectiveness so immunity does not divide by zero
const INCOMING_FLOOR: f32 = 0.25;

/// How favorable `mine` is against `theirs`
///
/// Offensive effectiveness divided by the effectiveness of the reverse
/// matchup. 1.0 is neutral; higher favors `mine`.
pub fn matchup_score(mine: ElementType, theirs: ElementType) -> f32 {
    effectiveness(mine, theirs) / effectiveness(theirs, mine).max(INCOMING_FLOOR)
}

/// `theirs` hits `mine` super effectively and `mine` has no answer back
pub fn is_disadvantaged(mine: ElementType, theirs: ElementType) -> bool {
    effectiveness(theirs, mine) > 1.0 && effectiveness(mine, theirs) <= 1.0
}

/// `mine` hits `theirs` super effectively and is not hit back as hard
pub fn has_advantage(mine: ElementType, theirs: ElementType) -> bool {
    is_disadvantaged(theirs, mine)
}

/// Types that are super effective against the defender
pub fn weaknesses(defender: ElementType) -> Vec<ElementType> {
    ElementType::ALL
        .iter()
        .copied()
        .filter(|t| effectiveness(*t, defender) > 1.0)
        .collect()
}

/// Types the defender resists (0 < effectiveness < 1)
pub fn resistances(defender: ElementType) -> Vec<ElementType> {
    ElementType::ALL
        .iter()
        .copied()
        .filter(|t| {
            let eff = effectiveness(*t, defender);
            eff > 0.0 && eff < 1.0
        })
        .collect()
}

/// Types the defender is immune to
pub fn immunities(defender: ElementType) -> Vec<ElementType> {
    ElementType::ALL
        .iter()
        .copied()
        .filter(|t| effectiveness(*t, defender) == 0.0)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_matchup_score() {
        // Water vs Fire: 2.0 out, 0.5 in
        assert_eq!(matchup_score(ElementType::Water, ElementType::Fire), 4.0);
        assert_eq!(matchup_score(ElementType::Fire, ElementType::Water), 0.25);
        assert_eq!(matchup_score(ElementType::Normal, ElementType::Normal), 1.0);
        // Ghost immune to Normal: incoming floored at 0.25
        assert_eq!(matchup_score(ElementType::Ghost, ElementType::Normal), 0.0);
        assert_eq!(matchup_score(ElementType::Normal, ElementType::Ghost), 0.0);
    }

    #[test]
    fn test_disadvantage() {
        assert!(is_disadvantaged(ElementType::Fire, ElementType::Water));
        assert!(!is_disadvantaged(ElementType::Water, ElementType::Fire));
        assert!(has_advantage(ElementType::Water, ElementType::Fire));
        // Mutual super effectiveness is not a clear disadvantage
        assert!(!is_disadvantaged(ElementType::Dragon, ElementType::Dragon));
        assert!(!is_disadvantaged(ElementType::Normal, ElementType::Normal));
    }

    #[test]
    fn test_weaknesses() {
        // Steel is weak to Fire, Fighting and Ground
        let weak = weaknesses(ElementType::Steel);
        assert!(weak.contains(&ElementType::Fire));
        assert!(weak.contains(&ElementType::Fighting));
        assert!(weak.contains(&ElementType::Ground));
        assert_eq!(weak.len(), 3);
    }

    #[test]
    fn test_resistances() {
        let resists = resistances(ElementType::Steel);
        assert!(resists.contains(&ElementType::Normal));
        assert!(resists.contains(&ElementType::Ice));
        assert!(resists.contains(&ElementType::Fairy));
        assert!(!resists.contains(&ElementType::Fire));
    }

    #[test]
    fn test_immunities() {
        let immune = immunities(ElementType::Ghost);
        assert_eq!(immune, vec![ElementType::Normal, ElementType::Fighting]);
    }
}

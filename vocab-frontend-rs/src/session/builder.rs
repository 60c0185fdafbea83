use chrono::{DateTime, Utc};
use rand::Rng;
use rand::seq::{IndexedRandom, SliceRandom};

use crate::config::TrainerConfig;
use crate::performance::PerformanceStore;
use crate::practice::select_needing_practice;
use crate::session::errors::SessionError;
use crate::session::quiz::{Direction, Question, QuizSession};
use crate::vocabulary::{VocabularyList, WordPair};

/// Builds a session asking every word of `list` once, words needing practice first in line for the quota.
pub fn build<R: Rng + ?Sized>(
    list: &VocabularyList,
    store: &PerformanceStore,
    now: DateTime<Utc>,
    rng: &mut R,
    config: &TrainerConfig,
) -> Result<QuizSession, SessionError> {
    if list.words.is_empty() {
        return Err(SessionError::EmptyList(list.id.clone()));
    }

    let practice = select_needing_practice(&list.id, &list.words, now, store, &config.practice);
    let mut words = pick_words(&list.words, &practice, config.session.practice_share, rng);
    words.shuffle(rng);

    let questions: Vec<Question> = words
        .into_iter()
        .map(|word| {
            let direction = if rng.random_bool(0.5) {
                Direction::ToTarget
            } else {
                Direction::ToSource
            };
            Question::new(word.clone(), direction)
        })
        .collect();

    log::info!(
        "Built a quiz of {} questions on list {} ({} words need practice)",
        questions.len(),
        list.id,
        practice.len()
    );

    Ok(QuizSession::new(
        list,
        questions,
        config.session.feedback_delay_ms,
    ))
}

/// Picks the session's words, unshuffled.
///
/// The practice quota is filled from the *front* of `practice` (list order), not at random. The
/// rest is drawn at random from the other words, then anything still missing is taken in list order.
fn pick_words<'a, R: Rng + ?Sized>(
    words: &'a [WordPair],
    practice: &[&'a WordPair],
    practice_share: f64,
    rng: &mut R,
) -> Vec<&'a WordPair> {
    let size = words.len();
    // the quota is the exact ceiling: 70 % of 10 words is 7, even though 10.0 * 0.7 > 7.0 in floats
    let quota = ((size as f64 * practice_share) - 1e-9).ceil().max(0.0) as usize;
    let quota = quota.min(practice.len()).min(size);

    let mut picked: Vec<&WordPair> = practice[..quota].to_vec();

    let others: Vec<&WordPair> = words
        .iter()
        .filter(|word| !practice.iter().any(|p| p.id == word.id))
        .collect();
    let random_count = others.len().min(size - picked.len());
    picked.extend(others.choose_multiple(rng, random_count).copied());

    if picked.len() < size {
        let missing: Vec<&WordPair> = words
            .iter()
            .filter(|word| !picked.iter().any(|p| p.id == word.id))
            .take(size - picked.len())
            .collect();
        picked.extend(missing);
    }

    picked
}

#[cfg(test)]
mod tests {
    use std::collections::{BTreeSet, HashSet};

    use chrono::TimeZone;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;
    use shelf::{MemoryBackend, Shelf};

    use super::*;
    use crate::vocabulary::TargetLanguage;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 1, 12, 0, 0).unwrap()
    }

    fn list(len: usize) -> VocabularyList {
        VocabularyList {
            id: "list".to_string(),
            name: "Cuisine".to_string(),
            target_language: TargetLanguage::German,
            words: (0..len)
                .map(|i| WordPair {
                    id: format!("w{i}"),
                    source_term: format!("mot{i}"),
                    translation: format!("Wort{i}"),
                })
                .collect(),
            created_at: now(),
            updated_at: now(),
        }
    }

    fn store() -> PerformanceStore {
        PerformanceStore::load(Shelf::new(MemoryBackend::new()))
    }

    /// Marks every word of `list` as mastered except those in `practice`.
    fn master_all_but(store: &mut PerformanceStore, list: &VocabularyList, practice: &[usize]) {
        for (i, word) in list.words.iter().enumerate() {
            if !practice.contains(&i) {
                store.record(&list.id, &word.id, true, now());
            }
        }
    }

    #[test]
    fn test_small_list_uses_every_word_once() {
        let list = list(5);
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let session = build(&list, &store(), now(), &mut rng, &TrainerConfig::default()).unwrap();

        let ids: BTreeSet<&str> = session
            .questions()
            .iter()
            .map(|q| q.word.id.as_str())
            .collect();
        assert_eq!(session.questions().len(), 5);
        assert_eq!(ids.len(), 5);
    }

    #[test]
    fn test_large_list_asks_every_word() {
        let list = list(25);
        let mut rng = ChaCha8Rng::seed_from_u64(2);
        let session = build(&list, &store(), now(), &mut rng, &TrainerConfig::default()).unwrap();

        let ids: BTreeSet<&str> = session
            .questions()
            .iter()
            .map(|q| q.word.id.as_str())
            .collect();
        assert_eq!(session.questions().len(), 25);
        assert_eq!(ids.len(), 25);
    }

    #[test]
    fn test_quota_is_the_exact_ceiling() {
        let list = list(10);
        let mut store = store();
        // only w9 is mastered, so the quota alone decides how many needy words come first
        master_all_but(&mut store, &list, &[0, 1, 2, 3, 4, 5, 6, 7, 8]);
        let practice = select_needing_practice(
            &list.id,
            &list.words,
            now(),
            &store,
            &TrainerConfig::default().practice,
        );
        let mut rng = ChaCha8Rng::seed_from_u64(9);
        let picked = pick_words(&list.words, &practice, 0.7, &mut rng);
        // 7 from the quota, then the mastered word
        assert_eq!(picked[7].id, "w9");
    }

    #[test]
    fn test_empty_list_is_rejected() {
        let list = list(0);
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let result = build(&list, &store(), now(), &mut rng, &TrainerConfig::default());
        assert!(matches!(result, Err(SessionError::EmptyList(id)) if id == "list"));
    }

    #[test]
    fn test_practice_quota_takes_the_first_words_in_list_order() {
        let list = list(20);
        let mut store = store();
        // 12 words need practice, all within the quota of 14
        let practice_indexes: Vec<usize> = (0..12).map(|i| i + 8).collect();
        master_all_but(&mut store, &list, &practice_indexes);

        let practice = select_needing_practice(
            &list.id,
            &list.words,
            now(),
            &store,
            &TrainerConfig::default().practice,
        );
        assert_eq!(practice.len(), 12);

        let mut rng = ChaCha8Rng::seed_from_u64(4);
        let picked = pick_words(&list.words, &practice, 0.7, &mut rng);
        let ids: Vec<&str> = picked.iter().map(|w| w.id.as_str()).collect();
        let needy: Vec<String> = (8..20).map(|i| format!("w{i}")).collect();
        assert_eq!(ids.len(), 20);
        assert_eq!(&ids[..12], needy.as_slice());
        // then every mastered word, in random order
        for id in &ids[12..] {
            let index: usize = id[1..].parse().unwrap();
            assert!(index < 8, "{id} should be a mastered word");
        }
    }

    #[test]
    fn test_top_up_in_list_order_when_few_other_words() {
        let list = list(10);
        let mut store = store();
        // everything but w9 needs practice
        master_all_but(&mut store, &list, &[0, 1, 2, 3, 4, 5, 6, 7, 8]);

        let practice = select_needing_practice(
            &list.id,
            &list.words,
            now(),
            &store,
            &TrainerConfig::default().practice,
        );
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        let picked = pick_words(&list.words, &practice, 0.7, &mut rng);
        let ids: Vec<&str> = picked.iter().map(|w| w.id.as_str()).collect();
        assert_eq!(
            ids,
            vec!["w0", "w1", "w2", "w3", "w4", "w5", "w6", "w9", "w7", "w8"]
        );
    }

    #[test]
    fn test_nothing_needs_practice() {
        let list = list(4);
        let mut store = store();
        master_all_but(&mut store, &list, &[]);
        let mut rng = ChaCha8Rng::seed_from_u64(6);
        let picked = pick_words(&list.words, &[], 0.7, &mut rng);
        let ids: BTreeSet<&str> = picked.iter().map(|w| w.id.as_str()).collect();
        assert_eq!(ids.len(), 4);
    }

    #[test]
    fn test_expected_answer_matches_direction() {
        let list = list(10);
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let session = build(&list, &store(), now(), &mut rng, &TrainerConfig::default()).unwrap();
        for question in session.questions() {
            let expected = match question.direction {
                Direction::ToTarget => &question.word.translation,
                Direction::ToSource => &question.word.source_term,
            };
            assert_eq!(&question.expected_answer, expected);
        }
    }

    #[test]
    fn test_order_and_directions_are_randomized() {
        let list = list(20);
        let store = store();
        let practice = select_needing_practice(
            &list.id,
            &list.words,
            now(),
            &store,
            &TrainerConfig::default().practice,
        );
        let mut rng = ChaCha8Rng::seed_from_u64(11);
        let unshuffled: Vec<String> = pick_words(&list.words, &practice, 0.7, &mut rng)
            .iter()
            .map(|w| w.id.clone())
            .collect();

        let mut rng = ChaCha8Rng::seed_from_u64(11);
        let session = build(&list, &store, now(), &mut rng, &TrainerConfig::default()).unwrap();
        let asked: Vec<String> = session
            .questions()
            .iter()
            .map(|q| q.word.id.clone())
            .collect();
        assert_ne!(asked, unshuffled);

        let directions: HashSet<Direction> =
            session.questions().iter().map(|q| q.direction).collect();
        assert_eq!(directions.len(), 2);
    }

    #[test]
    fn test_every_word_is_equally_likely_to_come_first() {
        let list = list(4);
        let store = store();
        let config = TrainerConfig::default();
        let mut firsts = [0usize; 4];
        let mut to_target = 0;
        for seed in 0..2000 {
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            let session = build(&list, &store, now(), &mut rng, &config).unwrap();
            let first = &session.questions()[0];
            let index: usize = first.word.id[1..].parse().unwrap();
            firsts[index] += 1;
            if first.direction == Direction::ToTarget {
                to_target += 1;
            }
        }
        // 500 expected each, with a standard deviation of about 19
        for count in firsts {
            assert!((400..=600).contains(&count), "{firsts:?}");
        }
        assert!((850..=1150).contains(&to_target), "{to_target}");
    }

    #[test]
    fn test_same_seed_same_session() {
        let list = list(15);
        let config = TrainerConfig::default();
        let order = |seed| {
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            build(&list, &store(), now(), &mut rng, &config)
                .unwrap()
                .questions()
                .iter()
                .map(|q| (q.word.id.clone(), q.direction))
                .collect::<Vec<_>>()
        };
        assert_eq!(order(42), order(42));
    }
}

use std::collections::HashMap;
use ndarray::{prelude::*, ErrorKind, ShapeError};
use crate::error::{Error, Result};

/// Trained vectors with the lookups used to inspect them.
/// Scores are cosine similarities, computed against row-normalized copies.
pub struct Similarity {
    w: Array2<f32>,
    unit: Array2<f32>,
    t2i: HashMap<String, usize>,
    i2t: Vec<String>,
}

fn l2_normalize(mut v: ArrayViewMut1<f32>) {
    let norm = v.dot(&v).sqrt();
    // zero rows stay zero and score 0 against everything
    if norm > 0.0 {
        v.mapv_inplace(|a| a / norm);
    }
}

impl Similarity {

    pub fn new(w: Array2<f32>, t2i: HashMap<String, usize>) -> Result<Similarity> {

        if w.nrows() != t2i.len() {
            return Err(Error::Config(format!("inconsistent number of entries in w ({}) and tokens ({})", w.nrows(), t2i.len())));
        }

        let mut i2t: Vec<Option<String>> = vec![None; t2i.len()];
        for (t, &i) in &t2i {
            match i2t.get_mut(i) {
                Some(slot) if slot.is_none() => *slot = Some(t.to_owned()),
                _ => return Err(Error::Config(format!("token {} has an invalid or repeated index {}", t, i))),
            }
        }
        // every slot is filled, the indexes are a permutation of 0..n
        let i2t: Vec<String> = i2t.into_iter().flatten().collect();

        let mut unit = w.clone();
        for row in unit.axis_iter_mut(Axis(0)) {
            l2_normalize(row);
        }

        Ok(Self { w, unit, t2i, i2t })
    }

    pub fn vocab_len(&self) -> usize {
        self.i2t.len()
    }

    pub fn dim(&self) -> usize {
        self.w.ncols()
    }

    pub fn contains(&self, token: &str) -> bool {
        self.t2i.contains_key(token)
    }

    fn index(&self, token: &str) -> Result<usize> {
        self.t2i
            .get(token)
            .copied()
            .ok_or_else(|| Error::OutOfVocabulary(token.to_owned()))
    }

    /// The raw trained vector of `token`.
    pub fn extract_vec_from_word(&self, token: &str) -> Result<Array1<f32>> {
        let i = self.index(token)?;
        Ok(self.w.row(i).to_owned())
    }

    pub fn similarity(&self, a: &str, b: &str) -> Result<f32> {
        let (i, j) = (self.index(a)?, self.index(b)?);
        Ok(self.unit.row(i).dot(&self.unit.row(j)))
    }

    fn rank(&self, query: Array1<f32>, k: usize, exclude: &[usize]) -> Result<Vec<(String, f32)>> {

        if query.len() != self.dim() {
            return Err(ShapeError::from_kind(ErrorKind::IncompatibleShape).into());
        }

        let mut query = query;
        l2_normalize(query.view_mut());

        // multiply all vectors by the query vector
        let scores = self.unit.dot(&query);
        let mut indexed_scores: Vec<(usize, f32)> = scores
            .iter()
            .copied()
            .enumerate()
            .filter(|(i, _)| !exclude.contains(i))
            .collect();

        // sort by most similar in descending order
        indexed_scores.sort_by(|(_i, s), (_j, t)| t.total_cmp(s));

        Ok(indexed_scores
            .into_iter()
            .take(k)
            .map(|(i, score)| (self.i2t[i].clone(), score))
            .collect())
    }

    /// The `k` tokens closest to an arbitrary vector, nothing excluded.
    pub fn find_k_most_similar(&self, vec: &Array1<f32>, k: usize) -> Result<Vec<(String, f32)>> {
        self.rank(vec.to_owned(), k, &[])
    }

    /// The `k` tokens closest to `token`, without `token` itself.
    pub fn most_similar(&self, token: &str, k: usize) -> Result<Vec<(String, f32)>> {
        let i = self.index(token)?;
        self.rank(self.unit.row(i).to_owned(), k, &[i])
    }

    /// Sums the unit vectors of `positive`, subtracts those of `negative`, and
    /// ranks the rest of the vocabulary against the result.
    pub fn most_similar_by(&self, positive: &[&str], negative: &[&str], k: usize) -> Result<Vec<(String, f32)>> {

        if positive.is_empty() && negative.is_empty() {
            return Err(Error::Config("most_similar_by needs at least one token".into()));
        }

        let mut query: Array1<f32> = Array1::zeros(self.dim());
        let mut exclude = Vec::new();
        for (tokens, sign) in [(positive, 1.0), (negative, -1.0)] {
            for token in tokens {
                let i = self.index(token)?;
                query.scaled_add(sign, &self.unit.row(i));
                exclude.push(i);
            }
        }

        self.rank(query, k, &exclude)
    }

    /// a is to b as c is to ?, i.e. b - a + c.
    pub fn extract_analogy_vec(&self, inputs: [&str; 3]) -> Result<Array1<f32>> {
        let [a, b, c] = inputs;
        let (a, b, c) = (self.index(a)?, self.index(b)?, self.index(c)?);
        Ok(&self.unit.row(b) - &self.unit.row(a) + &self.unit.row(c))
    }

    pub fn extract_analogies(&self, inputs: [&str; 3], k: usize) -> Result<Vec<(String, f32)>> {
        let [a, b, c] = inputs;
        self.most_similar_by(&[b, c], &[a], k)
    }
}

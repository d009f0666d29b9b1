use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

const MIN_CLUSTERS: usize = 5;
const MAX_CLUSTERS: usize = 20;
const KEYWORDS_PER_CLUSTER: usize = 50;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KMeansParams {
    pub clusters: usize,
    pub restarts: usize,
    pub max_iterations: usize,
    pub tolerance: f64,
    pub seed: u64,
}

impl KMeansParams {
    pub fn for_batch(points: usize, seed: u64, restarts: usize) -> Self {
        Self {
            clusters: cluster_count(points),
            restarts: restarts.max(1),
            max_iterations: 300,
            tolerance: 1e-6,
            seed,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct KMeansFit {
    pub labels: Vec<usize>,
    pub centroids: Vec<Vec<f64>>,
    pub inertia: f64,
}

pub fn cluster_count(points: usize) -> usize {
    (points / KEYWORDS_PER_CLUSTER)
        .clamp(MIN_CLUSTERS, MAX_CLUSTERS)
        .min(points)
}

pub fn fit(points: &[Vec<f32>], params: &KMeansParams) -> KMeansFit {
    let k = params.clusters.min(points.len());
    if k == 0 {
        return KMeansFit {
            labels: vec![0; points.len()],
            centroids: Vec::new(),
            inertia: 0.0,
        };
    }

    let points = points
        .iter()
        .map(|point| point.iter().map(|value| f64::from(*value)).collect())
        .collect::<Vec<Vec<f64>>>();

    let mut rng = StdRng::seed_from_u64(params.seed);
    let mut best: Option<KMeansFit> = None;
    for _ in 0..params.restarts.max(1) {
        let initial = kmeans_plus_plus(&points, k, &mut rng);
        let candidate = lloyd(&points, initial, params);
        let better = best.as_ref().is_none_or(|current| candidate.inertia < current.inertia);
        if better {
            best = Some(candidate);
        }
    }

    best.unwrap_or_else(|| KMeansFit {
        labels: vec![0; points.len()],
        centroids: Vec::new(),
        inertia: 0.0,
    })
}

fn kmeans_plus_plus(points: &[Vec<f64>], k: usize, rng: &mut StdRng) -> Vec<Vec<f64>> {
    let mut centroids = Vec::<Vec<f64>>::with_capacity(k);
    centroids.push(points[rng.gen_range(0..points.len())].clone());

    let mut nearest = points
        .iter()
        .map(|point| squared_distance(point, &centroids[0]))
        .collect::<Vec<f64>>();

    while centroids.len() < k {
        let total = nearest.iter().sum::<f64>();
        let index = if total > 0.0 && total.is_finite() {
            let target = rng.gen_range(0.0..total);
            let mut cumulative = 0.0;
            let mut chosen = points.len() - 1;
            for (index, distance) in nearest.iter().enumerate() {
                cumulative += distance;
                if cumulative > target {
                    chosen = index;
                    break;
                }
            }
            chosen
        } else {
            rng.gen_range(0..points.len())
        };

        let centroid = points[index].clone();
        for (slot, point) in nearest.iter_mut().zip(points) {
            *slot = slot.min(squared_distance(point, &centroid));
        }
        centroids.push(centroid);
    }

    centroids
}

fn lloyd(points: &[Vec<f64>], mut centroids: Vec<Vec<f64>>, params: &KMeansParams) -> KMeansFit {
    let k = centroids.len();
    let dimensions = points[0].len();
    let mut labels = vec![usize::MAX; points.len()];

    for _ in 0..params.max_iterations {
        let mut changed = false;
        for (label, point) in labels.iter_mut().zip(points) {
            let (closest, _) = nearest_centroid(point, &centroids);
            if *label != closest {
                *label = closest;
                changed = true;
            }
        }

        let mut sums = vec![vec![0.0_f64; dimensions]; k];
        let mut counts = vec![0_usize; k];
        for (label, point) in labels.iter().zip(points) {
            counts[*label] += 1;
            for (sum, value) in sums[*label].iter_mut().zip(point) {
                *sum += value;
            }
        }

        let mut shift = 0.0;
        let mut reseeded = Vec::<usize>::new();
        for cluster in 0..k {
            let updated = if counts[cluster] == 0 {
                let donor = farthest_point(points, &labels, &centroids, &reseeded);
                reseeded.push(donor);
                labels[donor] = cluster;
                changed = true;
                points[donor].clone()
            } else {
                let count = counts[cluster] as f64;
                sums[cluster].iter().map(|sum| sum / count).collect()
            };
            shift += squared_distance(&centroids[cluster], &updated);
            centroids[cluster] = updated;
        }

        if !changed || shift <= params.tolerance {
            break;
        }
    }

    for (label, point) in labels.iter_mut().zip(points) {
        *label = nearest_centroid(point, &centroids).0;
    }
    let inertia = labels
        .iter()
        .zip(points)
        .map(|(label, point)| squared_distance(point, &centroids[*label]))
        .sum();

    KMeansFit {
        labels,
        centroids,
        inertia,
    }
}

fn nearest_centroid(point: &[f64], centroids: &[Vec<f64>]) -> (usize, f64) {
    let mut best = (0, f64::INFINITY);
    for (index, centroid) in centroids.iter().enumerate() {
        let distance = squared_distance(point, centroid);
        if distance < best.1 {
            best = (index, distance);
        }
    }
    best
}

fn farthest_point(
    points: &[Vec<f64>],
    labels: &[usize],
    centroids: &[Vec<f64>],
    excluded: &[usize],
) -> usize {
    let mut best = (0, f64::NEG_INFINITY);
    for (index, (point, label)) in points.iter().zip(labels).enumerate() {
        if excluded.contains(&index) {
            continue;
        }
        let distance = squared_distance(point, &centroids[*label]);
        if distance > best.1 {
            best = (index, distance);
        }
    }
    best.0
}

fn squared_distance(left: &[f64], right: &[f64]) -> f64 {
    left.iter()
        .zip(right)
        .map(|(left_value, right_value)| (left_value - right_value).powi(2))
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn blob(center: (f32, f32), count: usize) -> Vec<Vec<f32>> {
        (0..count)
            .map(|index| {
                let offset = index as f32 * 0.01;
                vec![center.0 + offset, center.1 - offset]
            })
            .collect()
    }

    #[test]
    fn cluster_count_is_clamped_and_capped_by_batch_size() {
        assert_eq!(cluster_count(0), 0);
        assert_eq!(cluster_count(3), 3);
        assert_eq!(cluster_count(40), 5);
        assert_eq!(cluster_count(500), 10);
        assert_eq!(cluster_count(5000), 20);
    }

    #[test]
    fn separated_blobs_land_in_distinct_clusters() {
        let mut points = blob((0.0, 0.0), 5);
        points.extend(blob((10.0, 10.0), 5));
        points.extend(blob((-10.0, 10.0), 5));

        let params = KMeansParams {
            clusters: 3,
            restarts: 5,
            max_iterations: 100,
            tolerance: 1e-9,
            seed: 42,
        };
        let fit = fit(&points, &params);

        for group in fit.labels.chunks(5) {
            assert!(group.iter().all(|label| *label == group[0]));
        }
        assert_ne!(fit.labels[0], fit.labels[5]);
        assert_ne!(fit.labels[5], fit.labels[10]);
        assert_ne!(fit.labels[0], fit.labels[10]);
        assert!(fit.inertia < 1.0);
    }

    #[test]
    fn fixed_seed_is_reproducible() {
        let mut points = blob((0.0, 0.0), 8);
        points.extend(blob((3.0, 1.0), 8));
        let params = KMeansParams::for_batch(points.len(), 42, 10);

        assert_eq!(fit(&points, &params), fit(&points, &params));
    }

    #[test]
    fn duplicate_points_do_not_break_initialization() {
        let points = vec![vec![1.0_f32, 1.0]; 6];
        let params = KMeansParams::for_batch(points.len(), 7, 3);
        let fit = fit(&points, &params);

        assert_eq!(fit.labels.len(), 6);
        assert!(fit.labels.iter().all(|label| *label < params.clusters));
        assert_eq!(fit.inertia, 0.0);
    }
}

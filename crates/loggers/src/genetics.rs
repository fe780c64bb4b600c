//! Population statistics over raw genomes (one byte per gene).

/// Information content, in bits, of every gene position across `genomes`
///
/// Each gene byte is split into `8 / bits_per_symbol` symbols. For every
/// symbol position the Shannon entropy `H` of its value distribution over the
/// population is measured; the information is `bits_per_symbol - H`. Symbol
/// informations are summed per gene.
///
/// Genomes shorter than the longest are compared over the common prefix.
pub fn information_per_gene(genomes: &[&[u8]], bits_per_symbol: u32) -> Vec<f64> {
    debug_assert!(matches!(bits_per_symbol, 1 | 2 | 4 | 8));
    let Some(len) = genomes.iter().map(|g| g.len()).min() else {
        return Vec::new();
    };

    let alphabet = 1usize << bits_per_symbol;
    let mask = (alphabet - 1) as u8;
    let symbols_per_gene = 8 / bits_per_symbol;
    let n = genomes.len() as f64;
    let mut counts = vec![0usize; alphabet];

    (0..len)
        .map(|gene| {
            let mut info = 0.0;
            for symbol in 0..symbols_per_gene {
                counts.fill(0);
                let shift = symbol * bits_per_symbol;
                for genome in genomes {
                    counts[((genome[gene] >> shift) & mask) as usize] += 1;
                }
                let entropy: f64 = counts
                    .iter()
                    .filter(|&&c| c > 0)
                    .map(|&c| {
                        let p = c as f64 / n;
                        -p * p.log2()
                    })
                    .sum();
                info += f64::from(bits_per_symbol) - entropy;
            }
            info
        })
        .collect()
}

/// Population complexity: total information over all gene positions
pub fn complexity(genomes: &[&[u8]], bits_per_symbol: u32) -> f64 {
    information_per_gene(genomes, bits_per_symbol).iter().sum()
}

/// Genetic separation of two genomes in `[0, 1]`
///
/// Mean absolute gene difference over the common prefix, normalized by the
/// gene range. Identical or empty genomes have separation 0.
pub fn separation(a: &[u8], b: &[u8]) -> f64 {
    let len = a.len().min(b.len());
    if len == 0 {
        return 0.0;
    }
    let total: u64 = a
        .iter()
        .zip(b)
        .map(|(&x, &y)| u64::from(x.abs_diff(y)))
        .sum();
    total as f64 / (len as f64 * f64::from(u8::MAX))
}

//! Self-organizing-map color quantizer (NeuQuant).
//!
//! Reduces a contiguous RGB byte buffer to at most 256 representative
//! colors. 256 neurons start spread along the gray diagonal; training walks
//! the image at a prime stride, pulls the frequency-biased winner and a
//! shrinking neighbourhood toward each sample, then freezes the network and
//! builds a green-sorted index for fast nearest-color lookup.
//!
//! Each instance owns all of its neuron/bias/frequency state. One encode
//! invocation trains one instance; nothing is shared between concurrent
//! encodes. Results are only reproducible up to sampling order, so callers
//! should compare palettes by property, not byte-for-byte.

const NETSIZE: usize = 256;
const MAXNETPOS: i32 = NETSIZE as i32 - 1;

// Fixed-point scales.
const NETBIASSHIFT: i32 = 4;
const INTBIASSHIFT: i32 = 16;
const INTBIAS: i32 = 1 << INTBIASSHIFT;
const GAMMASHIFT: i32 = 10;
const BETASHIFT: i32 = 10;
const BETA: i32 = INTBIAS >> BETASHIFT;
const BETAGAMMA: i32 = INTBIAS << (GAMMASHIFT - BETASHIFT);

// Neighbourhood radius schedule.
const INITRAD: usize = NETSIZE >> 3;
const RADIUSBIASSHIFT: i32 = 6;
const RADIUSBIAS: i32 = 1 << RADIUSBIASSHIFT;
const INITRADIUS: i32 = (INITRAD as i32) * RADIUSBIAS;
const RADIUSDEC: i32 = 30;

// Learning rate schedule.
const ALPHABIASSHIFT: i32 = 10;
const INITALPHA: i32 = 1 << ALPHABIASSHIFT;
const RADBIASSHIFT: i32 = 8;
const RADBIAS: i32 = 1 << RADBIASSHIFT;
const ALPHARADBSHIFT: i32 = ALPHABIASSHIFT + RADBIASSHIFT;
const ALPHARADBIAS: i32 = 1 << ALPHARADBSHIFT;

const NCYCLES: i32 = 100;

// Prime strides keep samples spread over the image regardless of its size.
const PRIME1: usize = 499;
const PRIME2: usize = 491;
const PRIME3: usize = 487;
const PRIME4: usize = 503;

/// Inputs shorter than this sample every pixel instead of striding.
const MIN_PICTURE_BYTES: usize = 3 * PRIME4;

/// A trained NeuQuant network: palette plus nearest-color index.
#[derive(Clone, Debug)]
pub struct NeuQuant {
    /// Neuron color components in netbias fixed point; `[3]` carries the
    /// neuron's original position after unbiasing.
    network: Vec<[i32; 4]>,
    /// For each green value, where to start the bisected palette search.
    netindex: [i32; 256],
    bias: Vec<i32>,
    freq: Vec<i32>,
}

impl NeuQuant {
    /// Train a fresh network over `pixels` (tightly packed RGB).
    ///
    /// `quality` is the sampling factor: 1 visits every pixel (best,
    /// slowest), 30 visits roughly a thirtieth (fastest). Values are
    /// clamped into `1..=30`.
    pub fn train(pixels: &[u8], quality: u32) -> Self {
        let samplefac = quality.clamp(1, 30) as usize;
        let mut nq = Self {
            network: (0..NETSIZE)
                .map(|i| {
                    let v = ((i << (NETBIASSHIFT + 8)) / NETSIZE) as i32;
                    [v, v, v, 0]
                })
                .collect(),
            netindex: [0; 256],
            bias: vec![0; NETSIZE],
            freq: vec![INTBIAS / NETSIZE as i32; NETSIZE],
        };
        nq.learn(pixels, samplefac);
        nq.unbias();
        nq.build_index();
        nq
    }

    /// The flat palette: up to 256 RGB triples.
    pub fn palette(&self) -> Vec<u8> {
        // Restore original neuron order so indices are stable.
        let mut order = [0usize; NETSIZE];
        for (pos, neuron) in self.network.iter().enumerate() {
            order[neuron[3] as usize] = pos;
        }
        let mut map = Vec::with_capacity(NETSIZE * 3);
        for &pos in &order {
            let n = &self.network[pos];
            map.extend_from_slice(&[n[0] as u8, n[1] as u8, n[2] as u8]);
        }
        map
    }

    /// Map an arbitrary color to its nearest palette entry.
    pub fn index_of(&self, r: u8, g: u8, b: u8) -> u8 {
        let (r, g, b) = (i32::from(r), i32::from(g), i32::from(b));
        let mut bestd = 1000; // biggest possible distance is 256*3
        let mut best = -1;

        // Biased binary-ish search outward from the green bucket.
        let mut i = self.netindex[g as usize];
        let mut j = i - 1;
        while i < NETSIZE as i32 || j >= 0 {
            if i < NETSIZE as i32 {
                let n = &self.network[i as usize];
                let mut dist = n[1] - g;
                if dist >= bestd {
                    i = NETSIZE as i32; // green too far, stop upward scan
                } else {
                    i += 1;
                    dist += (n[0] - r).abs() + (n[2] - b).abs();
                    if dist < bestd {
                        bestd = dist;
                        best = n[3];
                    }
                }
            }
            if j >= 0 {
                let n = &self.network[j as usize];
                let mut dist = g - n[1];
                if dist >= bestd {
                    j = -1; // green too far, stop downward scan
                } else {
                    j -= 1;
                    dist += (n[0] - r).abs() + (n[2] - b).abs();
                    if dist < bestd {
                        bestd = dist;
                        best = n[3];
                    }
                }
            }
        }
        best.max(0) as u8
    }

    fn learn(&mut self, pixels: &[u8], mut samplefac: usize) {
        let lengthcount = pixels.len();
        if lengthcount < 3 {
            return;
        }
        if lengthcount < MIN_PICTURE_BYTES {
            samplefac = 1;
        }
        let alphadec = 30 + (samplefac as i32 - 1) / 3;
        let samplepixels = lengthcount / (3 * samplefac);
        let delta = (samplepixels as i32 / NCYCLES).max(1);
        let mut alpha = INITALPHA;
        let mut radius = INITRADIUS;

        let mut rad = (radius >> RADIUSBIASSHIFT) as usize;
        if rad <= 1 {
            rad = 0;
        }
        let mut radpower = vec![0i32; INITRAD];
        for (i, rp) in radpower.iter_mut().enumerate().take(rad) {
            let i2 = (i * i) as i32;
            *rp = alpha * (((rad * rad) as i32 - i2) * RADBIAS) / (rad * rad) as i32;
        }

        let step = if lengthcount % PRIME1 != 0 {
            3 * PRIME1
        } else if lengthcount % PRIME2 != 0 {
            3 * PRIME2
        } else if lengthcount % PRIME3 != 0 {
            3 * PRIME3
        } else {
            3 * PRIME4
        };

        let mut pos = 0usize;
        for i in 0..samplepixels {
            let r = i32::from(pixels[pos]) << NETBIASSHIFT;
            let g = i32::from(pixels[pos + 1]) << NETBIASSHIFT;
            let b = i32::from(pixels[pos + 2]) << NETBIASSHIFT;
            let winner = self.contest(r, g, b);

            self.alter_single(alpha, winner, r, g, b);
            if rad != 0 {
                self.alter_neighbours(rad, &radpower, winner, r, g, b);
            }

            pos += step;
            while pos >= lengthcount {
                pos -= lengthcount;
            }

            if (i as i32 + 1) % delta == 0 {
                alpha -= alpha / alphadec;
                radius -= radius / RADIUSDEC;
                rad = (radius >> RADIUSBIASSHIFT) as usize;
                if rad <= 1 {
                    rad = 0;
                }
                for (k, rp) in radpower.iter_mut().enumerate().take(rad) {
                    let k2 = (k * k) as i32;
                    *rp = alpha * (((rad * rad) as i32 - k2) * RADBIAS) / (rad * rad) as i32;
                }
            }
        }
    }

    /// Find the best-matching neuron, favouring under-used neurons so the
    /// palette does not collapse onto a few popular colors.
    fn contest(&mut self, r: i32, g: i32, b: i32) -> usize {
        let mut bestd = i32::MAX;
        let mut bestbiasd = bestd;
        let mut bestpos = 0usize;
        let mut bestbiaspos = 0usize;

        for i in 0..NETSIZE {
            let n = &self.network[i];
            let dist = (n[0] - r).abs() + (n[1] - g).abs() + (n[2] - b).abs();
            if dist < bestd {
                bestd = dist;
                bestpos = i;
            }
            let biasdist = dist - (self.bias[i] >> (INTBIASSHIFT - NETBIASSHIFT));
            if biasdist < bestbiasd {
                bestbiasd = biasdist;
                bestbiaspos = i;
            }
            let betafreq = self.freq[i] >> BETASHIFT;
            self.freq[i] -= betafreq;
            self.bias[i] += betafreq << GAMMASHIFT;
        }
        self.freq[bestpos] += BETA;
        self.bias[bestpos] -= BETAGAMMA;
        bestbiaspos
    }

    /// Move the winning neuron toward the sample by the current alpha.
    fn alter_single(&mut self, alpha: i32, pos: usize, r: i32, g: i32, b: i32) {
        let n = &mut self.network[pos];
        n[0] -= alpha * (n[0] - r) / INITALPHA;
        n[1] -= alpha * (n[1] - g) / INITALPHA;
        n[2] -= alpha * (n[2] - b) / INITALPHA;
    }

    /// Pull neurons within `rad` of the winner toward the sample, scaled by
    /// the precomputed radius falloff.
    fn alter_neighbours(
        &mut self,
        rad: usize,
        radpower: &[i32],
        pos: usize,
        r: i32,
        g: i32,
        b: i32,
    ) {
        let lo = pos.saturating_sub(rad);
        let hi = (pos + rad).min(NETSIZE - 1);

        let mut j = pos + 1;
        let mut k = pos.wrapping_sub(1);
        let mut m = 1usize;
        while j <= hi || (k >= lo && k < NETSIZE) {
            let a = radpower.get(m).copied().unwrap_or(0);
            m += 1;
            if a == 0 {
                break;
            }
            if j <= hi {
                let n = &mut self.network[j];
                n[0] -= a * (n[0] - r) / ALPHARADBIAS;
                n[1] -= a * (n[1] - g) / ALPHARADBIAS;
                n[2] -= a * (n[2] - b) / ALPHARADBIAS;
                j += 1;
            }
            if k >= lo && k < NETSIZE {
                let n = &mut self.network[k];
                n[0] -= a * (n[0] - r) / ALPHARADBIAS;
                n[1] -= a * (n[1] - g) / ALPHARADBIAS;
                n[2] -= a * (n[2] - b) / ALPHARADBIAS;
                k = k.wrapping_sub(1);
            }
        }
    }

    /// Strip the training fixed-point bias and remember original order.
    fn unbias(&mut self) {
        for (i, n) in self.network.iter_mut().enumerate() {
            for c in &mut n[..3] {
                *c = (*c >> NETBIASSHIFT).clamp(0, 255);
            }
            n[3] = i as i32;
        }
    }

    /// Sort neurons by green and record per-green-value start positions so
    /// lookups scan outward from a near hit instead of the whole table.
    fn build_index(&mut self) {
        let mut previouscol = 0i32;
        let mut startpos = 0i32;

        for i in 0..NETSIZE {
            let mut smallpos = i;
            let mut smallval = self.network[i][1];
            for j in (i + 1)..NETSIZE {
                if self.network[j][1] < smallval {
                    smallpos = j;
                    smallval = self.network[j][1];
                }
            }
            if i != smallpos {
                self.network.swap(i, smallpos);
            }
            if smallval != previouscol {
                self.netindex[previouscol as usize] = (startpos + i as i32) >> 1;
                for j in (previouscol + 1)..smallval {
                    self.netindex[j as usize] = i as i32;
                }
                previouscol = smallval;
                startpos = i as i32;
            }
        }
        self.netindex[previouscol as usize] = (startpos + MAXNETPOS) >> 1;
        for j in (previouscol + 1)..256 {
            self.netindex[j as usize] = MAXNETPOS;
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/quant/neuquant.rs"]
mod tests;

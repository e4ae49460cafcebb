//! GIF-variant LZW compression.
//!
//! Dictionary entries live in a classic open-addressing hash table keyed by
//! `(prefix code, next symbol)` with XOR hashing and `hsize - slot`
//! displacement probing. The probing order is load-bearing: it decides
//! which codes get allocated first, so changing it changes the emitted bit
//! stream (still decodable, but no longer bit-identical against reference
//! encoders).

const BITS: i32 = 12;
const HSIZE: usize = 5003; // 80% occupancy at 4096 codes
const MAX_MAXCODE: i32 = 1 << BITS;

/// Compresses one indexed-pixel buffer into GIF image sub-blocks.
///
/// Input symbols must be strictly less than `1 << initial_code_size`;
/// out-of-range indices are an upstream contract violation and are not
/// defended here.
pub struct LzwCompressor {
    init_bits: i32,
    clear_code: i32,
    eof_code: i32,

    n_bits: i32,
    maxcode: i32,
    free_ent: i32,
    clear_flg: bool,

    cur_accum: u32,
    cur_bits: i32,

    htab: Vec<i32>,
    codetab: Vec<i32>,

    // 255-byte sub-block staging area.
    accum: [u8; 256],
    a_count: usize,
}

impl LzwCompressor {
    /// `initial_code_size` is the bit width needed for the palette, with the
    /// GIF-mandated minimum of 2.
    pub fn new(initial_code_size: u8) -> Self {
        let init_bits = i32::from(initial_code_size.max(2)) + 1;
        let clear_code = 1 << (init_bits - 1);
        Self {
            init_bits,
            clear_code,
            eof_code: clear_code + 1,
            n_bits: init_bits,
            maxcode: (1 << init_bits) - 1,
            free_ent: clear_code + 2,
            clear_flg: false,
            cur_accum: 0,
            cur_bits: 0,
            htab: vec![-1; HSIZE],
            codetab: vec![0; HSIZE],
            accum: [0; 256],
            a_count: 0,
        }
    }

    /// Compress `pixels` and append length-prefixed sub-blocks plus the
    /// zero-length terminator to `out`.
    pub fn compress(mut self, pixels: &[u8], out: &mut Vec<u8>) {
        if pixels.is_empty() {
            self.emit(self.clear_code, out);
            self.emit(self.eof_code, out);
            out.push(0);
            return;
        }

        let mut hshift = 0;
        let mut fcode = HSIZE as i32;
        while fcode < 65536 {
            hshift += 1;
            fcode *= 2;
        }
        let hshift = 8 - hshift;

        let mut ent = i32::from(pixels[0]);
        self.emit(self.clear_code, out);

        for &px in &pixels[1..] {
            let c = i32::from(px);
            let fcode = (c << BITS) + ent;
            let mut i = ((c << hshift) ^ ent) as usize;

            if self.htab[i] == fcode {
                ent = self.codetab[i];
                continue;
            }
            if self.htab[i] >= 0 {
                // Secondary hash: displacement stays tied to the first slot.
                let mut disp = HSIZE - i;
                if i == 0 {
                    disp = 1;
                }
                loop {
                    i = i.wrapping_sub(disp);
                    if i >= HSIZE {
                        i = i.wrapping_add(HSIZE);
                    }
                    if self.htab[i] < 0 || self.htab[i] == fcode {
                        break;
                    }
                }
                if self.htab[i] == fcode {
                    ent = self.codetab[i];
                    continue;
                }
            }

            self.emit(ent, out);
            ent = c;
            if self.free_ent < MAX_MAXCODE {
                self.codetab[i] = self.free_ent;
                self.free_ent += 1;
                self.htab[i] = fcode;
            } else {
                // Table full at 12 bits: reset rather than overflow.
                self.clear_table(out);
            }
        }

        self.emit(ent, out);
        let eof = self.eof_code;
        self.emit(eof, out);
        out.push(0);
    }

    fn clear_table(&mut self, out: &mut Vec<u8>) {
        self.htab.fill(-1);
        self.free_ent = self.clear_code + 2;
        self.clear_flg = true;
        let clear = self.clear_code;
        self.emit(clear, out);
    }

    /// Pack one code into the bit accumulator, widening the code size as the
    /// allocation count outgrows the current width.
    fn emit(&mut self, code: i32, out: &mut Vec<u8>) {
        self.cur_accum |= (code as u32) << self.cur_bits;
        self.cur_bits += self.n_bits;

        while self.cur_bits >= 8 {
            self.byte_out((self.cur_accum & 0xFF) as u8, out);
            self.cur_accum >>= 8;
            self.cur_bits -= 8;
        }

        if self.free_ent > self.maxcode || self.clear_flg {
            if self.clear_flg {
                self.n_bits = self.init_bits;
                self.maxcode = (1 << self.n_bits) - 1;
                self.clear_flg = false;
            } else {
                self.n_bits += 1;
                self.maxcode = if self.n_bits == BITS {
                    MAX_MAXCODE
                } else {
                    (1 << self.n_bits) - 1
                };
            }
        }

        if code == self.eof_code {
            while self.cur_bits > 0 {
                self.byte_out((self.cur_accum & 0xFF) as u8, out);
                self.cur_accum >>= 8;
                self.cur_bits -= 8;
            }
            self.flush_block(out);
        }
    }

    fn byte_out(&mut self, b: u8, out: &mut Vec<u8>) {
        self.accum[self.a_count] = b;
        self.a_count += 1;
        if self.a_count >= 254 {
            self.flush_block(out);
        }
    }

    fn flush_block(&mut self, out: &mut Vec<u8>) {
        if self.a_count > 0 {
            out.push(self.a_count as u8);
            out.extend_from_slice(&self.accum[..self.a_count]);
            self.a_count = 0;
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/encode/lzw.rs"]
mod tests;

use crate::Error;

/// Maximal-cycle tap positions, numbered from 1 with the highest tap equal to
/// the width. Sorted by width. Taken from the table by Roy Ward and Tim
/// Molteno, "Table of Linear Feedback Shift Registers" (2012).
pub const LFSR_TAP_TABLE: &[(usize, &[usize])] = &[
    (2, &[2, 1]),
    (3, &[3, 2]),
    (4, &[4, 3]),
    (5, &[5, 3]),
    (6, &[6, 5]),
    (7, &[7, 6]),
    (8, &[8, 6, 5, 4]),
    (9, &[9, 5]),
    (10, &[10, 7]),
    (11, &[11, 9]),
    (12, &[12, 11, 8, 6]),
    (13, &[13, 12, 10, 9]),
    (14, &[14, 13, 11, 9]),
    (15, &[15, 14]),
    (16, &[16, 14, 13, 11]),
    (17, &[17, 14]),
    (18, &[18, 11]),
    (19, &[19, 18, 17, 14]),
    (20, &[20, 17]),
    (21, &[21, 19]),
    (22, &[22, 21]),
    (23, &[23, 18]),
    (24, &[24, 23, 21, 20]),
    (25, &[25, 22]),
    (26, &[26, 25, 24, 20]),
    (27, &[27, 26, 25, 22]),
    (28, &[28, 25]),
    (29, &[29, 27]),
    (30, &[30, 29, 26, 24]),
    (31, &[31, 28]),
    (32, &[32, 30, 26, 25]),
    (37, &[37, 36, 33, 31]),
    (39, &[39, 35]),
    (64, &[64, 63, 61, 60]),
    (83, &[83, 81, 79, 76]),
    (128, &[128, 127, 126, 121]),
    (256, &[256, 254, 251, 246]),
    (1024, &[1024, 1015, 1002, 1001]),
    (2048, &[2048, 2035, 2034, 2029]),
    (4096, &[4096, 4095, 4081, 4069]),
];

/// Returns the maximal-length taps for an LFSR of bitwidth `w`
pub fn lfsr_taps(w: usize) -> Result<&'static [usize], Error> {
    LFSR_TAP_TABLE
        .binary_search_by_key(&w, |(width, _)| *width)
        .map(|i| LFSR_TAP_TABLE[i].1)
        .map_err(|_| Error::UnsupportedWidth(w))
}

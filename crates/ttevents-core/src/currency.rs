// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Currency codes accepted by the vendor SDK on commerce events.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

macro_rules! currencies {
    ($($code:ident),+ $(,)?) => {
        /// ISO 4217 code from the vendor SDK's fixed currency set.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum Currency {
            $($code,)+
        }

        impl Currency {
            pub const ALL: &'static [Currency] = &[$(Currency::$code,)+];

            /// Three-letter code, as the SDK expects it.
            pub fn code(&self) -> &'static str {
                match self {
                    $(Self::$code => stringify!($code),)+
                }
            }
        }

        impl FromStr for Currency {
            type Err = UnknownCurrency;

            /// Exact, case-sensitive match on the code.
            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $(stringify!($code) => Ok(Self::$code),)+
                    _ => Err(UnknownCurrency),
                }
            }
        }
    };
}

currencies!(
    AED, ARS, AUD, BDT, BHD, BIF, BOB, BRL, CAD, CHF, CLP, CNY, COP, CRC, CZK, DKK, DZD, EGP,
    EUR, GBP, GTQ, HKD, HNL, HUF, IDR, ILS, INR, ISK, JPY, KES, KHR, KRW, KWD, KZT, MAD, MOP,
    MXN, MYR, NGN, NIO, NOK, NZD, OMR, PEN, PHP, PKR, PLN, PYG, QAR, RON, RUB, SAR, SEK, SGD,
    THB, TRY, TWD, UAH, USD, VES, VND, ZAR,
);

/// The string is not in the SDK's currency set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnknownCurrency;

impl std::fmt::Display for Currency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}

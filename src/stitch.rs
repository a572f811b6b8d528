// Copyright 2022 The ChromiumOS Authors
// Use of this source code is governed by a BSD-style license that can be
// found in the LICENSE file.

//! Stitching of dual-IFE stripe outputs.
//!
//! In dual-IFE mode the frame is split vertically: the left IFE produces the first
//! `left_horiz_num` columns of every region row and the right IFE the remaining
//! `right_horiz_num` ones. Both stripes store their regions in raster order over their own
//! columns, so rebuilding the frame means interleaving one row of the left stripe with one row
//! of the right stripe.

use thiserror::Error;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Stripe {
    Left,
    Right,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum StitchError {
    #[error("neither stripe has horizontal regions")]
    EmptyGeometry,
    #[error("output holds {capacity} elements but {required} were requested")]
    OutputTooSmall { capacity: usize, required: usize },
    #[error("{stripe:?} stripe buffer has no element {index}")]
    SourceOverrun { stripe: Stripe, index: usize },
}

/// One output slot of a stitched frame and where its data comes from.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct StitchedSlot {
    pub output_index: usize,
    pub stripe: Stripe,
    /// Index of the element inside its stripe buffer.
    pub stripe_index: usize,
}

/// Walks the output slots of a stitched frame in raster order.
#[derive(Clone, Debug)]
pub struct StripeWalker {
    left_horiz_num: usize,
    right_horiz_num: usize,
    number_of_elements: usize,
    output_index: usize,
    row: usize,
    column: usize,
}

impl StripeWalker {
    pub fn new(
        left_horiz_num: usize,
        right_horiz_num: usize,
        number_of_elements: usize,
    ) -> Result<Self, StitchError> {
        if number_of_elements > 0 && left_horiz_num + right_horiz_num == 0 {
            return Err(StitchError::EmptyGeometry);
        }

        Ok(Self {
            left_horiz_num,
            right_horiz_num,
            number_of_elements,
            output_index: 0,
            row: 0,
            column: 0,
        })
    }
}

impl Iterator for StripeWalker {
    type Item = StitchedSlot;

    fn next(&mut self) -> Option<Self::Item> {
        if self.output_index >= self.number_of_elements {
            return None;
        }

        let output_index = self.output_index;
        let slot = if self.column < self.left_horiz_num {
            StitchedSlot {
                output_index,
                stripe: Stripe::Left,
                stripe_index: output_index - self.row * self.right_horiz_num,
            }
        } else {
            StitchedSlot {
                output_index,
                stripe: Stripe::Right,
                stripe_index: output_index - (self.row + 1) * self.left_horiz_num,
            }
        };

        self.output_index += 1;
        self.column += 1;
        if self.column >= self.left_horiz_num + self.right_horiz_num {
            self.column = 0;
            self.row += 1;
        }

        Some(slot)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.number_of_elements - self.output_index;
        (remaining, Some(remaining))
    }
}

/// Interleaves the rows of two stripe buffers of `element_size`-byte elements into `output`.
pub fn stitch_dual_ife_stripe_buffers(
    left_buffer: &[u8],
    right_buffer: &[u8],
    output_buffer: &mut [u8],
    element_size: usize,
    left_horiz_num: usize,
    right_horiz_num: usize,
    number_of_elements: usize,
) -> Result<(), StitchError> {
    let capacity = output_buffer.len().checked_div(element_size).unwrap_or(0);
    if capacity < number_of_elements {
        return Err(StitchError::OutputTooSmall {
            capacity,
            required: number_of_elements,
        });
    }

    for slot in StripeWalker::new(left_horiz_num, right_horiz_num, number_of_elements)? {
        let source = match slot.stripe {
            Stripe::Left => left_buffer,
            Stripe::Right => right_buffer,
        };
        let start = slot.stripe_index * element_size;
        let element = source
            .get(start..start + element_size)
            .ok_or(StitchError::SourceOverrun {
                stripe: slot.stripe,
                index: slot.stripe_index,
            })?;

        let out_start = slot.output_index * element_size;
        output_buffer[out_start..out_start + element_size].copy_from_slice(element);
    }

    Ok(())
}

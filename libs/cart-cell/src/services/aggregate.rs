// libs/cart-cell/src/services/aggregate.rs
use shared_models::{CartEntry, CartKind};

/// Which storefront page is currently active. The header badge shows a
/// different count/total depending on the page; the caller supplies the
/// context, the aggregator only switches on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActivePage {
    Pharmacy,
    Diagnostic,
    Appointment,
}

impl ActivePage {
    fn kind(self) -> CartKind {
        match self {
            ActivePage::Pharmacy => CartKind::Pharmacy,
            ActivePage::Diagnostic => CartKind::Diagnostic,
            ActivePage::Appointment => CartKind::Appointment,
        }
    }
}

/// Pure aggregation over the three loaded entry arrays.
pub struct CartView<'a> {
    pub pharmacy: &'a [CartEntry],
    pub appointments: &'a [CartEntry],
    pub diagnostics: &'a [CartEntry],
}

impl<'a> CartView<'a> {
    pub fn new(
        pharmacy: &'a [CartEntry],
        appointments: &'a [CartEntry],
        diagnostics: &'a [CartEntry],
    ) -> Self {
        Self {
            pharmacy,
            appointments,
            diagnostics,
        }
    }

    fn entries_for(&self, kind: CartKind) -> &[CartEntry] {
        match kind {
            CartKind::Pharmacy => self.pharmacy,
            CartKind::Appointment => self.appointments,
            CartKind::Diagnostic => self.diagnostics,
        }
    }

    pub fn count_for(&self, kind: CartKind) -> usize {
        self.entries_for(kind)
            .iter()
            .filter(|e| e.kind() == kind)
            .count()
    }

    /// Σ(resolved unit price × quantity). Pharmacy entries resolve to
    /// the inventory snapshot's discounted price when one is present.
    pub fn total_for(&self, kind: CartKind) -> f64 {
        self.entries_for(kind)
            .iter()
            .filter(|e| e.kind() == kind)
            .map(CartEntry::line_total)
            .sum()
    }

    pub fn active_count(&self, page: ActivePage) -> usize {
        self.count_for(page.kind())
    }

    pub fn active_total(&self, page: ActivePage) -> f64 {
        self.total_for(page.kind())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared_models::{
        AppointmentEntry, AppointmentTag, DiagnosticEntry, DiagnosticTag, InventorySnapshot,
        PharmacyEntry,
    };

    fn pharmacy(unit: f64, discounted: Option<f64>, qty: u32) -> CartEntry {
        CartEntry::Pharmacy(PharmacyEntry {
            product_id: 1,
            product_name: "Test".to_string(),
            unit_price: unit,
            quantity: qty,
            inventory: discounted.map(|d| InventorySnapshot {
                mrp: unit,
                discounted_price: Some(d),
                discount_percent: None,
            }),
            total_payable: 0.0,
        })
    }

    fn appointment(price: f64) -> CartEntry {
        CartEntry::Appointment(AppointmentEntry {
            tag: AppointmentTag::Appointment,
            case_lead_id: 1,
            cart_unique_id: 100,
            cart_details_id: 1,
            patient_name: String::new(),
            relationship: "Self".to_string(),
            doctor_name: "Dr. Rao".to_string(),
            specialization: String::new(),
            consultation_type: "Consultation".to_string(),
            appointment_date: "2026-09-01".to_string(),
            appointment_time: "10:00".to_string(),
            price,
            quantity: 1,
        })
    }

    fn diagnostic(price: f64, qty: u32) -> CartEntry {
        CartEntry::Diagnostic(DiagnosticEntry {
            tag: DiagnosticTag::Diagnostic,
            test_id: 9,
            test_name: "CBC".to_string(),
            price,
            quantity: qty,
            beneficiary: "Self".to_string(),
            center_id: Some(4),
        })
    }

    #[test]
    fn pharmacy_total_prefers_discounted_price() {
        let pharmacy_entries = vec![pharmacy(120.0, Some(100.0), 3), pharmacy(50.0, None, 2)];
        let appointments = vec![appointment(500.0)];
        let diagnostics = vec![diagnostic(350.0, 1)];
        let view = CartView::new(&pharmacy_entries, &appointments, &diagnostics);

        // 100×3 + 50×2, unaffected by the other kinds.
        assert_eq!(view.active_total(ActivePage::Pharmacy), 400.0);
        assert_eq!(view.active_count(ActivePage::Pharmacy), 2);
    }

    #[test]
    fn active_badge_switches_with_page_context() {
        let pharmacy_entries = vec![pharmacy(10.0, None, 1)];
        let appointments = vec![appointment(500.0)];
        let diagnostics = vec![diagnostic(350.0, 2)];
        let view = CartView::new(&pharmacy_entries, &appointments, &diagnostics);

        assert_eq!(view.active_total(ActivePage::Appointment), 500.0);
        assert_eq!(view.active_total(ActivePage::Diagnostic), 700.0);
        assert_eq!(view.active_count(ActivePage::Diagnostic), 1);
    }

    #[test]
    fn totals_ignore_entries_of_other_kinds_in_the_slice() {
        // A booking slot loaded unfiltered contains both kinds.
        let mixed = vec![appointment(500.0), diagnostic(350.0, 1)];
        let view = CartView::new(&[], &mixed, &mixed);
        assert_eq!(view.total_for(CartKind::Appointment), 500.0);
        assert_eq!(view.total_for(CartKind::Diagnostic), 350.0);
        assert_eq!(view.count_for(CartKind::Appointment), 1);
    }
}

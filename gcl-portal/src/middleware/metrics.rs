use crate::server::PORTAL_REQUESTS;
use actix_web::{
    body::MessageBody,
    dev::{Service, ServiceRequest, ServiceResponse},
};
use futures::Future;
use futures_util::future::FutureExt;

pub(crate) fn collect_metrics<
    B: MessageBody,
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = actix_web::Error>,
>(
    req: ServiceRequest,
    srv: &S,
) -> impl Future<Output = Result<ServiceResponse<B>, actix_web::Error>> {
    let path = req.match_pattern().unwrap_or_else(|| "-".to_string());

    srv.call(req).map(move |res| {
        let status = match &res {
            Ok(resp) => resp.status(),
            Err(e) => e.as_response_error().status_code(),
        };

        PORTAL_REQUESTS
            .with_label_values(&[&path, status.as_str()])
            .inc();

        res
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::server::tests::{default_setup, get_as};
    use actix_http::StatusCode;
    use actix_web::test;

    #[actix_web::test]
    async fn test_get_metrics() {
        let (app, _root) = default_setup().await;

        let before = PORTAL_REQUESTS
            .with_label_values(&["/cert-info", "302"])
            .get();

        // Redirected by the certificate gate.
        let res = test::call_service(&app, get_as("/cert-info", "alice").to_request()).await;
        assert_eq!(res.status(), StatusCode::FOUND);

        // Redirected to the login page.
        let res = test::call_service(&app, test::TestRequest::get().uri("/cert-info").to_request()).await;
        assert_eq!(res.status(), StatusCode::FOUND);

        let after = PORTAL_REQUESTS
            .with_label_values(&["/cert-info", "302"])
            .get();
        assert!(after >= before + 2);

        let req = test::TestRequest::get().uri("/metrics").to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::OK);
        let body = test::read_body(res).await;
        let body = std::str::from_utf8(&body).unwrap();

        assert!(body.contains("# TYPE gridcert_requests counter"));
        assert!(body.contains("gridcert_requests{path=\"/cert-info\",status=\"302\"}"));
        assert!(body.contains("gridcert_gate_outcomes{gate=\"certificate\",outcome=\"redirect\"}"));
    }
}
